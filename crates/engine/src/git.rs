// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Git Poller & Change Detector (§4.3). Git fetch mechanics themselves
//! are an external collaborator out of scope for this crate (§1) — this
//! module depends only on a [`ResourceFetcher`] abstraction that resolves a
//! ref to a HEAD commit id and lists byte blobs for changed paths under it.
//! A real fetcher (shallow clone, `git2`, a hosted-API client) is wired in
//! by the binary crate; tests use an in-memory double.

use std::collections::BTreeMap;
use std::time::Duration;

use eoc_core::DeploymentId;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::{EngineEvent, EventSender};
use crate::error::EngineError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// One changed deployment manifest found between two polls (§4.3).
#[derive(Debug, Clone)]
pub struct DeploymentChange {
    pub deployment_id: DeploymentId,
    pub content_bytes: Vec<u8>,
}

/// Resolves a ref to byte content for deployment manifest paths. The Git
/// fetch mechanics behind an implementation (clone URL, auth, local working
/// copy) are entirely the caller's concern — this trait only asks "what
/// changed, and what are the new bytes" (§1).
#[async_trait::async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// The current HEAD commit id (or equivalent content version marker).
    async fn head(&self) -> Result<String, EngineError>;

    /// Every deployment manifest path and its current bytes, as of `head`.
    /// Keyed by deployment id so the poller can diff against the previous
    /// poll's snapshot without caring about file paths.
    async fn list_manifests(&self, head: &str) -> Result<BTreeMap<DeploymentId, Vec<u8>>, EngineError>;
}

/// Periodically polls a [`ResourceFetcher`] and emits a
/// [`EngineEvent::GitChange`] for every deployment manifest whose content
/// changed since the last successful poll (§4.3). A poll failure is logged
/// and retried on the next tick; it never mutates local state (§4.3,
/// "Failure").
pub struct GitPoller<F: ResourceFetcher> {
    fetcher: F,
    interval: Duration,
    events: EventSender,
}

impl<F: ResourceFetcher> GitPoller<F> {
    pub fn new(fetcher: F, events: EventSender) -> Self {
        Self { fetcher, interval: DEFAULT_POLL_INTERVAL, events }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one poll cycle: fetch HEAD, compare to `last_head`, diff
    /// manifests against `last_snapshot`, emit changes, and return the new
    /// head/snapshot for the next cycle. Returns `None` when HEAD is
    /// unchanged (no-op poll).
    async fn poll_once(
        &self,
        last_head: Option<&str>,
        last_snapshot: &BTreeMap<DeploymentId, Vec<u8>>,
    ) -> Result<Option<(String, BTreeMap<DeploymentId, Vec<u8>>)>, EngineError> {
        let head = self.fetcher.head().await?;
        if last_head == Some(head.as_str()) {
            return Ok(None);
        }

        let snapshot = self.fetcher.list_manifests(&head).await?;
        for (deployment_id, bytes) in &snapshot {
            let changed = last_snapshot.get(deployment_id).map(|prev| prev != bytes).unwrap_or(true);
            if changed {
                self.events.send(EngineEvent::GitChange(DeploymentChange {
                    deployment_id: deployment_id.clone(),
                    content_bytes: bytes.clone(),
                }));
            }
        }
        Ok(Some((head, snapshot)))
    }

    /// Run the poll ticker until `cancel` fires (§5, "long-lived workers").
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        let mut last_head: Option<String> = None;
        let mut last_snapshot: BTreeMap<DeploymentId, Vec<u8>> = BTreeMap::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("git poller shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    match self.poll_once(last_head.as_deref(), &last_snapshot).await {
                        Ok(Some((head, snapshot))) => {
                            last_head = Some(head);
                            last_snapshot = snapshot;
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!(error = %e, "git poll failed, retrying next tick"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
