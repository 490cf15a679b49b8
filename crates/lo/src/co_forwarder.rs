// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forwards converged/failed [`DeploymentStatus`] reports to the Central
//! Orchestrator over HTTP (§4.11, §6 "CO HTTP (consumed by LO)"). The CO's
//! own admission/catalog surface is an external collaborator out of scope
//! (§1) — this crate only needs to know the one endpoint it posts to.

use eoc_core::DeploymentStatus;
use eoc_engine::{CoForwarder, EngineError};

/// Posts every status report to `<co_url>/deployments/<id>/status` (§6).
/// Transient failures are retried with a small fixed backoff before
/// surfacing (§7, "Transient I/O").
pub struct HttpCoForwarder {
    client: reqwest::Client,
    co_url: String,
    max_attempts: u32,
}

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: std::time::Duration = std::time::Duration::from_millis(200);

impl HttpCoForwarder {
    pub fn new(co_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), co_url: co_url.into(), max_attempts: DEFAULT_MAX_ATTEMPTS }
    }
}

#[async_trait::async_trait]
impl CoForwarder for HttpCoForwarder {
    async fn forward(&self, status: DeploymentStatus) -> Result<(), EngineError> {
        let url = format!("{}/deployments/{}/status", self.co_url, status.deployment_id);

        let mut last_err = None;
        for attempt in 1..=self.max_attempts {
            match self.client.post(&url).json(&status).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => {
                    last_err = Some(format!("CO responded with {}", resp.status()));
                }
                Err(e) => {
                    last_err = Some(e.to_string());
                }
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
        Err(EngineError::Forward(last_err.unwrap_or_else(|| "unknown error".to_string())))
    }
}

#[cfg(test)]
#[path = "co_forwarder_tests.rs"]
mod tests;
