// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Reconciler (§4.7): loads desired/actual/host state for one
//! deployment, computes its diff against alive hosts, journals the
//! resulting ops, and hands them to the [`Actuator`]. Grounded on
//! `original_source/internal/lo/reconcilier/LO_reconciler_diff_and_schema.go`'s
//! `Reconciler`/`Reconcile` — one entry point, serialized per deployment,
//! safe to re-run (idempotent: an already-converged deployment reconciles
//! to zero ops).

use std::collections::HashMap;
use std::sync::Arc;

use eoc_core::{Clock, DeploymentId, Host, SiteId};
use eoc_bus::MessageBus;
use eoc_store::StateStore;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;

use crate::actuator::Actuator;
use crate::diff::compute_diff;
use crate::error::EngineError;

/// Reconciles one deployment at a time, end to end (§4.7).
pub struct Reconciler<B: MessageBus, C: Clock> {
    site_id: SiteId,
    clock: C,
    store: StateStore,
    actuator: Arc<Actuator<B>>,
    locks: Mutex<HashMap<DeploymentId, Arc<AsyncMutex<()>>>>,
}

impl<B: MessageBus + 'static, C: Clock> Reconciler<B, C> {
    pub fn new(site_id: SiteId, clock: C, store: StateStore, actuator: Arc<Actuator<B>>) -> Self {
        Self { site_id, clock, store, actuator, locks: Mutex::new(HashMap::new()) }
    }

    /// Reconcile `deployment_id` toward its current desired state.
    /// Serialized per deployment id; concurrent reconciles of distinct
    /// deployments proceed independently (§4.7, "Concurrency").
    pub async fn reconcile(&self, deployment_id: &DeploymentId) -> Result<usize, EngineError> {
        let lock = self.lock_for(deployment_id);
        let _guard = lock.lock().await;

        let desired = self.store.get_desired(deployment_id)?.unwrap_or_default();
        let actual = self.store.get_actual()?;
        let hosts = self.store.load_all_hosts()?;
        let alive: Vec<&Host> = hosts.iter().filter(|h| h.alive).collect();

        let timestamp = self.clock.epoch_nanos();
        let ops = compute_diff(&self.site_id, deployment_id, &desired, &actual, &alive, timestamp);

        tracing::info!(deployment_id = %deployment_id, op_count = ops.len(), "reconciled");

        for op in &ops {
            self.store.set_operation(op).await?;
            // A single op's dispatch failing (e.g. a transient bus error)
            // must not abort the rest of the batch (§7; SPEC_FULL §11,
            // "Per-op dispatch continues past failure").
            if let Err(e) = self.actuator.execute(op).await {
                tracing::error!(
                    deployment_id = %deployment_id,
                    host_id = %op.host_id,
                    action = %op.action,
                    error = %e,
                    "op dispatch failed, continuing with remaining ops"
                );
            }
        }
        Ok(ops.len())
    }

    fn lock_for(&self, deployment_id: &DeploymentId) -> Arc<AsyncMutex<()>> {
        self.locks
            .lock()
            .entry(deployment_id.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
