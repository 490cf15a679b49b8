// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the reconciliation core (§7). Low layers' errors are
/// folded in via `#[from]`; the Reconciler aggregates per-op failures rather
/// than propagating the first one (§7, "never aborts the whole list").
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] eoc_store::StoreError),

    #[error(transparent)]
    Bus(#[from] eoc_bus::BusError),

    #[error(transparent)]
    Runtime(#[from] eoc_runtime::RuntimeError),

    #[error("deployment payload rejected: {0}")]
    DeploymentRejected(String),

    #[error("no plugin selected for this agent")]
    NoPluginSelected,

    #[error("forwarding status to CO failed: {0}")]
    Forward(String),
}
