// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;

use crate::error::RuntimeError;
use crate::spec::{ComponentSpec, ComponentStatus};

/// Backend implementing the component lifecycle contract for one execution
/// technology (§4.10). `name ∈ {containerd, wasm, mock}` (§9).
///
/// Implementations must make every method safe to call on a name/spec that
/// does not exist yet or no longer exists — the Lifecycle Controller relies
/// on `Stop`/`Delete` being idempotent when recovering from `failed` (§4.9).
#[async_trait]
pub trait RuntimePlugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> &'static [&'static str];

    /// Resolve and pull the artifact referenced by `spec.artifact`.
    /// Idempotent: re-pulling an already-present artifact is a no-op.
    async fn install(&self, spec: &ComponentSpec) -> Result<(), RuntimeError>;

    /// Create and start a task for `spec`. Assumes `install` already ran.
    async fn start(&self, spec: &ComponentSpec) -> Result<(), RuntimeError>;

    /// Stop the named component's running task. Safe to call when no task
    /// is running.
    async fn stop(&self, name: &str) -> Result<(), RuntimeError>;

    /// Best-effort stop, then delete the component entirely. Safe to call
    /// on an already-deleted name.
    async fn delete(&self, name: &str) -> Result<(), RuntimeError>;

    /// Current observed state of the named component.
    async fn status(&self, name: &str) -> Result<ComponentStatus, RuntimeError>;
}
