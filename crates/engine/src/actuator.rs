// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Actuator (§4.8): publishes [`DiffOp`]s to the bus for ERA to apply,
//! and consumes ERA's status reports to mirror outcomes back into the
//! actual-state store. Grounded on
//! `original_source/internal/lo/actuators/nats_actuator.go` for the publish
//! side; the status-consumption side is this spec's own addition (§4.8,
//! §4.11) with no direct original_source counterpart.

use std::collections::BTreeMap;
use std::sync::Arc;

use eoc_bus::{deploy_subject, status_wildcard, MessageBus, Subscription};
use eoc_core::{
    canonical_hash, Action, ActualApp, ActualComponent, ComponentStatusKind, DeploymentStatus,
    DiffOp, OverallState, SiteId,
};
use eoc_store::StateStore;
use tokio::sync::mpsc;

use crate::error::EngineError;

const STATUS_CHANNEL_CAPACITY: usize = 256;

/// Forwards a converged or failed [`DeploymentStatus`] on to the Central
/// Orchestrator. The HTTP specifics (endpoint shape, auth) are an external
/// collaborator out of scope for this crate (§1) — `eoc-lo` implements this
/// trait over `reqwest`.
#[async_trait::async_trait]
pub trait CoForwarder: Send + Sync {
    async fn forward(&self, status: DeploymentStatus) -> Result<(), EngineError>;
}

/// A [`CoForwarder`] that discards every report — useful for tests and for
/// standalone sites with no CO configured.
#[derive(Default)]
pub struct NoopForwarder;

#[async_trait::async_trait]
impl CoForwarder for NoopForwarder {
    async fn forward(&self, _status: DeploymentStatus) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Executes [`DiffOp`]s by publishing them to the per-host deploy subject,
/// and folds ERA's status reports back into the actual-state store (§4.8).
pub struct Actuator<B: MessageBus> {
    site_id: SiteId,
    bus: Arc<B>,
    store: StateStore,
    forwarder: Arc<dyn CoForwarder>,
}

impl<B: MessageBus + 'static> Actuator<B> {
    pub fn new(site_id: SiteId, bus: Arc<B>, store: StateStore, forwarder: Arc<dyn CoForwarder>) -> Self {
        Self { site_id, bus, store, forwarder }
    }

    /// Publish one op for ERA to apply (§4.8). The caller (the reconciler)
    /// is responsible for journaling `op` first so the status handler can
    /// look it back up by `(deployment_id, timestamp)`.
    pub async fn execute(&self, op: &DiffOp) -> Result<(), EngineError> {
        let subject = deploy_subject(&self.site_id.to_string(), &op.host_id.to_string());
        self.bus.publish(&subject, op).await?;
        Ok(())
    }

    /// Subscribe to every host's status subject in this site and drive
    /// [`Self::handle_status`] for each report, off the bus's own delivery
    /// task (§4.8). Returns the live subscription; dropping or unsubscribing
    /// it stops delivery.
    pub async fn run(self: Arc<Self>) -> Result<Box<dyn Subscription>, EngineError> {
        let (tx, mut rx) = mpsc::channel::<DeploymentStatus>(STATUS_CHANNEL_CAPACITY);
        let pattern = status_wildcard(&self.site_id.to_string());

        let sub = self
            .bus
            .subscribe::<DeploymentStatus, _>(&pattern, move |status| {
                if tx.try_send(status).is_err() {
                    tracing::warn!("actuator status channel full, dropping report");
                }
            })
            .await?;

        let this = self.clone();
        tokio::spawn(async move {
            while let Some(status) = rx.recv().await {
                if let Err(e) = this.handle_status(status).await {
                    tracing::error!(error = %e, "failed to apply status report");
                }
            }
        });

        Ok(sub)
    }

    async fn handle_status(&self, status: DeploymentStatus) -> Result<(), EngineError> {
        let Some(op) = self.store.get_operation(&status.deployment_id, status.timestamp)? else {
            tracing::warn!(
                deployment_id = %status.deployment_id,
                timestamp = status.timestamp,
                "status report for unknown operation, ignoring"
            );
            return Ok(());
        };

        match status.state {
            OverallState::Installed => self.apply_success(&op).await?,
            OverallState::Failed => self.apply_failure(&op).await?,
            OverallState::Pending | OverallState::Installing => {}
        }

        self.forwarder.forward(status).await
    }

    /// On convergence, mutate the actual-state store to match the op's
    /// snapshot and advance its convergence hash (§4.8).
    async fn apply_success(&self, op: &DiffOp) -> Result<(), EngineError> {
        match op.action {
            Action::AddApp | Action::UpdateApp => {
                let components = op
                    .app
                    .components
                    .iter()
                    .map(|(name, c)| {
                        (
                            name.clone(),
                            ActualComponent {
                                name: name.clone(),
                                status: ComponentStatusKind::Success,
                                version: c.version.clone(),
                                last_updated: op.timestamp as u64,
                                hash: canonical_hash(c),
                            },
                        )
                    })
                    .collect();
                let actual = ActualApp {
                    id: op.app.id.clone(),
                    version: op.app.version.clone(),
                    components,
                    hash: canonical_hash(&op.app),
                };
                self.store.set_actual(&op.host_id, &actual).await?;
            }
            Action::RemoveApp => {
                self.store.remove_actual_app(&op.host_id, &op.app.id).await?;
            }
            Action::AddComp | Action::UpdateComp => {
                let Some(name) = &op.comp_name else { return Ok(()) };
                let Some(component) = op.app.components.get(name) else { return Ok(()) };
                let mut actual = self
                    .store
                    .get_actual_app(&op.host_id, &op.app.id)?
                    .unwrap_or_else(|| empty_actual(&op.app));
                actual.components.insert(
                    name.clone(),
                    ActualComponent {
                        name: name.clone(),
                        status: ComponentStatusKind::Success,
                        version: component.version.clone(),
                        last_updated: op.timestamp as u64,
                        hash: canonical_hash(component),
                    },
                );
                actual.version = op.app.version.clone();
                actual.hash = converged_hash(&actual, &op.app);
                self.store.set_actual(&op.host_id, &actual).await?;
            }
            Action::RemoveComp => {
                let Some(name) = &op.comp_name else { return Ok(()) };
                let Some(mut actual) = self.store.get_actual_app(&op.host_id, &op.app.id)? else {
                    return Ok(());
                };
                actual.components.remove(name);
                actual.hash = converged_hash(&actual, &op.app);
                self.store.set_actual(&op.host_id, &actual).await?;
            }
        }
        Ok(())
    }

    /// On failure, record the failed component(s) without advancing the
    /// convergence hash, so the next reconcile retries this op (§4.8,
    /// §4.9 "Failure does not advance convergence").
    async fn apply_failure(&self, op: &DiffOp) -> Result<(), EngineError> {
        let Some(mut actual) = self.store.get_actual_app(&op.host_id, &op.app.id)? else {
            return Ok(());
        };
        actual.hash.clear();
        if let Some(name) = &op.comp_name {
            if let Some(comp) = actual.components.get_mut(name) {
                comp.status = ComponentStatusKind::Failed;
                comp.hash.clear();
            }
        }
        self.store.set_actual(&op.host_id, &actual).await?;
        Ok(())
    }
}

fn empty_actual(desired: &eoc_core::App) -> ActualApp {
    ActualApp {
        id: desired.id.clone(),
        version: desired.version.clone(),
        components: BTreeMap::new(),
        hash: String::new(),
    }
}

/// An `ActualApp` is only converged once it carries exactly the components
/// `desired` names — otherwise leave the hash blank so the diff engine
/// keeps reconciling the rest (§4.6, step 3).
fn converged_hash(actual: &ActualApp, desired: &eoc_core::App) -> String {
    let same_keys = actual.components.keys().eq(desired.components.keys());
    if same_keys {
        canonical_hash(desired)
    } else {
        String::new()
    }
}

#[cfg(test)]
#[path = "actuator_tests.rs"]
mod tests;
