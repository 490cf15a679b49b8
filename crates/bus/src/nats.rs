// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::BusError;
use crate::traits::{MessageBus, Subscription};

/// Production [`MessageBus`] backed by `async-nats`.
#[derive(Clone)]
pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    /// Connect to the NATS server at `url` (e.g. `NATS_URL`, §6).
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        let client = async_nats::connect(url).await?;
        Ok(Self { client })
    }

    pub fn from_client(client: async_nats::Client) -> Self {
        Self { client }
    }
}

pub struct NatsSubscription {
    task: tokio::task::JoinHandle<()>,
}

#[async_trait]
impl Subscription for NatsSubscription {
    async fn unsubscribe(self: Box<Self>) -> Result<(), BusError> {
        self.task.abort();
        Ok(())
    }
}

#[async_trait]
impl MessageBus for NatsBus {
    async fn publish<T: Serialize + Send + Sync>(
        &self,
        subject: &str,
        value: &T,
    ) -> Result<(), BusError> {
        let payload = serde_json::to_vec(value)?;
        self.client.publish(subject.to_string(), payload.into()).await?;
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
        let mut sub = self.client.subscribe(subject_pattern.to_string()).await?;
        let task = tokio::spawn(async move {
            while let Some(msg) = sub.next().await {
                match serde_json::from_slice::<T>(&msg.payload) {
                    Ok(value) => handler(value),
                    Err(err) => {
                        tracing::warn!(
                            subject = %msg.subject,
                            error = %err,
                            "dropping malformed bus message"
                        );
                    }
                }
            }
        });
        Ok(Box::new(NatsSubscription { task }))
    }

    async fn flush(&self) -> Result<(), BusError> {
        self.client.flush().await?;
        Ok(())
    }
}
