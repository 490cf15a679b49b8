// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("json encode/decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("write queue is closed")]
    WriterGone,

    #[error("write queue reply channel dropped")]
    ReplyDropped,
}
