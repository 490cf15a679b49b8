// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::BusError;

/// A live subscription. Dropping it stops delivery; `unsubscribe` does the
/// same thing explicitly and lets the caller observe shutdown.
#[async_trait]
pub trait Subscription: Send {
    async fn unsubscribe(self: Box<Self>) -> Result<(), BusError>;
}

/// Subject-addressed pub/sub (§4.2). Implementations: [`crate::NatsBus`]
/// (production) and [`crate::MockBus`] (in-process double for tests).
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Serialize `value` and publish it on `subject`.
    async fn publish<T: Serialize + Send + Sync>(
        &self,
        subject: &str,
        value: &T,
    ) -> Result<(), BusError>;

    /// Subscribe to `subject_pattern` (single-token wildcards via `*`
    /// supported by the underlying transport). `handler` is invoked once
    /// per delivered message, decoded into `T`; malformed payloads are
    /// logged and dropped rather than killing the subscription.
    async fn subscribe<T, F>(
        &self,
        subject_pattern: &str,
        handler: F,
    ) -> Result<Box<dyn Subscription>, BusError>
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T) + Send + Sync + 'static;

    /// Block until every buffered outbound message has been sent.
    async fn flush(&self) -> Result<(), BusError>;
}
