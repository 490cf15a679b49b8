// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ERA-side Lifecycle Controller (§4.9): maps one [`DiffOp`] onto a
//! sequence of [`RuntimePlugin`] calls and reports the outcome as a
//! [`DeploymentStatus`]. Grounded on
//! `original_source/internal/era/lifecycle/controller.go`'s
//! `HandleAction`/`handleAddApp` and its commented-out reference handlers
//! for update/remove/add-comp, which this spec's action table (§4.9)
//! generalizes uniformly across all six actions.

use eoc_core::{Action, App, ComponentName, ComponentStatus, DeploymentStatus, DiffOp, OverallState};
use eoc_runtime::{ComponentSpec, RuntimePlugin};
use std::sync::Arc;

/// Dispatches [`DiffOp`]s to a single [`RuntimePlugin`] and builds the
/// resulting status report. One controller is bound to one runtime backend
/// per ERA process (§4.10, "one plugin per agent").
pub struct LifecycleController {
    plugin: Arc<dyn RuntimePlugin>,
}

impl LifecycleController {
    pub fn new(plugin: Arc<dyn RuntimePlugin>) -> Self {
        Self { plugin }
    }

    /// Apply `op` and report the resulting [`DeploymentStatus`] (§4.9). The
    /// action table:
    /// - `add_app` → install every component, then start every component
    /// - `update_app` / `update_comp` → stop, delete, install, start
    /// - `remove_app` / `remove_comp` → stop, delete
    /// - `add_comp` → install, start
    pub async fn apply(&self, op: &DiffOp) -> DeploymentStatus {
        let components = match op.action {
            Action::AddApp => self.install_then_start_all(&op.app).await,
            Action::UpdateApp => self.update_all(&op.app).await,
            Action::RemoveApp => self.remove_all(&op.app).await,
            Action::AddComp => self.install_start_target(op).await,
            Action::UpdateComp => self.update_target(op).await,
            Action::RemoveComp => self.remove_target(op).await,
        };
        DeploymentStatus::new(op.deployment_id.clone(), op.timestamp, components)
    }

    async fn install_then_start_all(&self, app: &App) -> Vec<ComponentStatus> {
        let mut failed: Vec<(ComponentName, String)> = Vec::new();

        for component in app.components.values() {
            let spec = ComponentSpec::from(component);
            if let Err(e) = self.plugin.install(&spec).await {
                tracing::error!(component = %component.name, error = %e, "install failed");
                failed.push((component.name.clone(), e.to_string()));
            }
        }
        for component in app.components.values() {
            if failed.iter().any(|(name, _)| *name == component.name) {
                continue;
            }
            let spec = ComponentSpec::from(component);
            if let Err(e) = self.plugin.start(&spec).await {
                tracing::error!(component = %component.name, error = %e, "start failed");
                failed.push((component.name.clone(), e.to_string()));
            }
        }

        app.components
            .keys()
            .map(|name| status_for(name.clone(), failed.iter().find(|(n, _)| n == name).map(|(_, e)| e.clone())))
            .collect()
    }

    async fn update_all(&self, app: &App) -> Vec<ComponentStatus> {
        let mut out = Vec::with_capacity(app.components.len());
        for component in app.components.values() {
            let spec = ComponentSpec::from(component);
            let err = self.stop_delete_install_start(&spec).await.err();
            out.push(status_for(component.name.clone(), err));
        }
        out
    }

    async fn remove_all(&self, app: &App) -> Vec<ComponentStatus> {
        let mut out = Vec::with_capacity(app.components.len());
        for component in app.components.values() {
            let err = self.stop_delete(&component.name).await.err();
            out.push(status_for(component.name.clone(), err));
        }
        out
    }

    async fn install_start_target(&self, op: &DiffOp) -> Vec<ComponentStatus> {
        let Some((name, component)) = target(op) else {
            return Vec::new();
        };
        let spec = ComponentSpec::from(component);
        let mut err = self.plugin.install(&spec).await.err().map(|e| e.to_string());
        if err.is_none() {
            err = self.plugin.start(&spec).await.err().map(|e| e.to_string());
        }
        vec![status_for(name.clone(), err)]
    }

    async fn update_target(&self, op: &DiffOp) -> Vec<ComponentStatus> {
        let Some((name, component)) = target(op) else {
            return Vec::new();
        };
        let spec = ComponentSpec::from(component);
        let err = self.stop_delete_install_start(&spec).await.err();
        vec![status_for(name.clone(), err)]
    }

    async fn remove_target(&self, op: &DiffOp) -> Vec<ComponentStatus> {
        let Some(name) = &op.comp_name else {
            return Vec::new();
        };
        let err = self.stop_delete(name).await.err();
        vec![status_for(name.clone(), err)]
    }

    /// `update_app` / `update_comp`: stop and delete are best-effort (a
    /// plugin's `stop`/`delete` must already be safe to call on a name that
    /// isn't running, per [`RuntimePlugin`]'s contract), so only `install`
    /// and `start` failures fail the op.
    async fn stop_delete_install_start(&self, spec: &ComponentSpec) -> Result<(), String> {
        if let Err(e) = self.plugin.stop(&spec.name).await {
            tracing::warn!(component = %spec.name, error = %e, "stop failed, continuing");
        }
        if let Err(e) = self.plugin.delete(&spec.name).await {
            tracing::warn!(component = %spec.name, error = %e, "delete failed, continuing");
        }
        self.plugin.install(spec).await.map_err(|e| e.to_string())?;
        self.plugin.start(spec).await.map_err(|e| e.to_string())
    }

    /// `remove_app` / `remove_comp`: stop is best-effort, delete's error is
    /// the one that fails the op.
    async fn stop_delete(&self, name: &str) -> Result<(), String> {
        if let Err(e) = self.plugin.stop(name).await {
            tracing::warn!(component = %name, error = %e, "stop failed, continuing");
        }
        self.plugin.delete(name).await.map_err(|e| e.to_string())
    }
}

fn target(op: &DiffOp) -> Option<(&ComponentName, &eoc_core::Component)> {
    let name = op.comp_name.as_ref()?;
    let component = op.app.components.get(name)?;
    Some((name, component))
}

/// A successfully-applied op reports `Installed` — for this status report
/// that means "the commanded action converged", not literally "the
/// component is in the installed lifecycle phase" (§4.9, §4.11).
fn status_for(name: ComponentName, error: Option<String>) -> ComponentStatus {
    match error {
        Some(error) => ComponentStatus { name, state: OverallState::Failed, error: Some(error) },
        None => ComponentStatus { name, state: OverallState::Installed, error: None },
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
