// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("nats connect error: {0}")]
    Connect(#[from] async_nats::ConnectError),

    #[error("nats publish error: {0}")]
    Publish(#[from] async_nats::PublishError),

    #[error("nats subscribe error: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    #[error("nats flush error: {0}")]
    Flush(#[from] async_nats::client::FlushError),

    #[error("json encode/decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("publish timed out after {0:?}")]
    PublishTimeout(std::time::Duration),

    #[error("transport error: {0}")]
    Transport(String),
}
