// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Desired Intake & Event Dispatcher (§4.4). A single dispatcher drains
//! a bounded channel in arrival order and, for each Git-polled change,
//! parses the manifest, canonicalizes it into an [`App`], persists it as the
//! new desired state, and hands the deployment off to the reconciler.
//! Grounded on the teacher's channel-plus-single-consumer worker shape
//! (`daemon::engine::runtime::monitor`) generalized to this spec's event
//! vocabulary.

use std::sync::Arc;

use eoc_bus::MessageBus;
use eoc_core::{App, Clock};
use eoc_store::StateStore;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;
use crate::git::DeploymentChange;
use crate::manifest::parse_application_deployment;
use crate::reconciler::Reconciler;

/// Default channel depth (§4.4). The channel drops the newest event when
/// full rather than blocking the poller — a dropped event is recovered on
/// the poller's next tick since it re-diffs against current HEAD.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 20;

/// Events the dispatcher consumes, in arrival order (§4.4).
#[derive(Debug, Clone)]
pub enum EngineEvent {
    GitChange(DeploymentChange),
}

/// A cloneable handle producers use to enqueue events without blocking.
#[derive(Clone)]
pub struct EventSender {
    inner: mpsc::Sender<EngineEvent>,
}

impl EventSender {
    /// Enqueue an event, dropping it silently if the channel is full (§4.4,
    /// "Backpressure").
    pub fn send(&self, event: EngineEvent) {
        if self.inner.try_send(event).is_err() {
            tracing::warn!("engine event channel full, dropping event");
        }
    }
}

/// Builds a bounded event channel: an [`EventSender`] for producers (the
/// git poller) and the receiving half consumed by [`Dispatcher::run`].
pub fn channel() -> (EventSender, mpsc::Receiver<EngineEvent>) {
    channel_with_capacity(DEFAULT_CHANNEL_CAPACITY)
}

pub fn channel_with_capacity(capacity: usize) -> (EventSender, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender { inner: tx }, rx)
}

/// Parses a deployment manifest's bytes into a canonical [`App`] (§4.4,
/// steps 1-2): parse into [`crate::manifest::ApplicationDeployment`], then
/// convert. Manifests are YAML, matching the teacher's config-loading
/// convention (`serde_yaml`).
pub fn parse_manifest(bytes: &[u8]) -> Result<App, EngineError> {
    parse_application_deployment(bytes).map(App::from)
}

/// Drains events in arrival order and drives the intake pipeline (§4.4).
pub struct Dispatcher<B: MessageBus, C: Clock> {
    store: StateStore,
    reconciler: Arc<Reconciler<B, C>>,
}

impl<B: MessageBus + 'static, C: Clock + 'static> Dispatcher<B, C> {
    pub fn new(store: StateStore, reconciler: Arc<Reconciler<B, C>>) -> Self {
        Self { store, reconciler }
    }

    async fn handle(&self, event: EngineEvent) {
        match event {
            EngineEvent::GitChange(change) => {
                let app = match parse_manifest(&change.content_bytes) {
                    Ok(app) => app,
                    Err(e) => {
                        tracing::warn!(deployment_id = %change.deployment_id, error = %e, "rejecting manifest");
                        return;
                    }
                };
                if let Err(e) = self.store.set_desired(&change.deployment_id, &app).await {
                    tracing::error!(deployment_id = %change.deployment_id, error = %e, "failed to persist desired state");
                    return;
                }
                if let Err(e) = self.reconciler.reconcile(&change.deployment_id).await {
                    tracing::error!(deployment_id = %change.deployment_id, error = %e, "reconcile failed");
                }
            }
        }
    }

    /// Consume events until the channel closes or `cancel` fires.
    pub async fn run(self, mut events: mpsc::Receiver<EngineEvent>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("dispatcher shutting down");
                    return;
                }
                event = events.recv() => {
                    match event {
                        Some(event) => self.handle(event).await,
                        None => {
                            tracing::info!("dispatcher channel closed");
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
