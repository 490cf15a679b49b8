// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process [`MessageBus`] double. Used by `eoc-engine`/`eoc-lo`/`eoc-era`
//! test suites in place of a real NATS server — the same role the runtime
//! plugin registry's mock backend (§4.10) plays for the container runtime.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::BusError;
use crate::traits::{MessageBus, Subscription};

type RawHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

struct Sub {
    pattern: Vec<String>,
    handler: RawHandler,
}

#[derive(Clone, Default)]
pub struct MockBus {
    subs: Arc<Mutex<Vec<Sub>>>,
    published: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    fail_subjects: Arc<Mutex<Vec<String>>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message published so far, in publish order — for test
    /// assertions that don't want to wire up a subscriber.
    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.published.lock().clone()
    }

    /// Make the next `publish` to an exactly-matching `subject` return a
    /// transport error instead of delivering — for exercising callers'
    /// per-op failure handling (e.g. the Reconciler's "one failing op must
    /// not abort the batch" contract).
    pub fn fail_next_publish_to(&self, subject: impl Into<String>) {
        self.fail_subjects.lock().push(subject.into());
    }

    fn matches(pattern: &[String], subject: &str) -> bool {
        let tokens: Vec<&str> = subject.split('.').collect();
        if tokens.len() != pattern.len() {
            return false;
        }
        pattern.iter().zip(tokens).all(|(p, t)| p == "*" || p == t)
    }
}

pub struct MockSubscription;

#[async_trait]
impl Subscription for MockSubscription {
    async fn unsubscribe(self: Box<Self>) -> Result<(), BusError> {
        Ok(())
    }
}

#[async_trait]
impl MessageBus for MockBus {
    async fn publish<T: Serialize + Send + Sync>(
        &self,
        subject: &str,
        value: &T,
    ) -> Result<(), BusError> {
        {
            let mut fail = self.fail_subjects.lock();
            if let Some(pos) = fail.iter().position(|s| s == subject) {
                fail.remove(pos);
                return Err(BusError::Transport("injected publish failure".to_string()));
            }
        }
        let payload = serde_json::to_vec(value)?;
        self.published.lock().push((subject.to_string(), payload.clone()));
        let handlers: Vec<RawHandler> = self
            .subs
            .lock()
            .iter()
            .filter(|s| Self::matches(&s.pattern, subject))
            .map(|s| s.handler.clone())
            .collect();
        for handler in handlers {
            handler(&payload);
        }
        Ok(())
    }

    async fn subscribe<T, F>(
        &self,
        subject_pattern: &str,
        handler: F,
    ) -> Result<Box<dyn Subscription>, BusError>
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let pattern: Vec<String> = subject_pattern.split('.').map(str::to_string).collect();
        let raw: RawHandler = Arc::new(move |bytes: &[u8]| {
            if let Ok(value) = serde_json::from_slice::<T>(bytes) {
                handler(value);
            }
        });
        self.subs.lock().push(Sub { pattern, handler: raw });
        Ok(Box::new(MockSubscription))
    }

    async fn flush(&self) -> Result<(), BusError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
