// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The container runtime backend (§4.10, "Container backend contract").
//! Grounded on `original_source/internal/era/plugins/containerd/containerd_plugin.go`
//! for the operation sequence (pull, create-with-snapshot, null-IO task,
//! SIGTERM-then-SIGKILL stop, safe-on-missing delete); grounded on the
//! teacher's `daemon::adapters::agent::docker` for the shell-out-to-CLI
//! implementation style (`tokio::process::Command` wrapping a `run_docker`
//! helper) rather than linking a containerd client library.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::RuntimeError;
use crate::spec::{ComponentSpec, ComponentStatus, TaskState};
use crate::traits::RuntimePlugin;

const STOP_GRACE: Duration = Duration::from_secs(5);

/// Tracked state for one component's container, mirroring the containerd
/// plugin's `containers map[string]containerd.Container` — mutation
/// guarded by a per-plugin mutex (§5, "Shared resource policy").
#[derive(Clone)]
struct ContainerHandle {
    container_name: String,
}

/// Container backend shelling out to the `docker` CLI. One instance per
/// ERA process; the active plugin selected by configuration (§4.10).
#[derive(Clone)]
pub struct ContainerBackend {
    containers: std::sync::Arc<Mutex<HashMap<String, ContainerHandle>>>,
}

impl Default for ContainerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBackend {
    pub fn new() -> Self {
        Self { containers: std::sync::Arc::new(Mutex::new(HashMap::new())) }
    }

    fn container_name(spec_name: &str) -> String {
        format!("eoc-{spec_name}")
    }
}

#[async_trait]
impl RuntimePlugin for ContainerBackend {
    fn name(&self) -> &'static str {
        "containerd"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["oci", "containerd"]
    }

    async fn install(&self, spec: &ComponentSpec) -> Result<(), RuntimeError> {
        if spec.artifact.is_empty() {
            return Err(RuntimeError::CommandFailed {
                cmd: "docker pull",
                target: spec.name.clone(),
                stderr: "artifact (image) is empty".to_string(),
            });
        }
        tracing::info!(component = %spec.name, artifact = %spec.artifact, "pulling image");
        // `docker pull` is itself idempotent: re-pulling an already-present
        // tag is a local no-op on the daemon side.
        run_docker(&["pull", &spec.artifact]).await?;
        Ok(())
    }

    async fn start(&self, spec: &ComponentSpec) -> Result<(), RuntimeError> {
        let container_name = Self::container_name(&spec.name);
        tracing::info!(component = %spec.name, %container_name, "starting container");

        // Best-effort cleanup of a stale container occupying the name —
        // mirrors the containerd plugin creating a fresh snapshot per start.
        let _ = run_docker(&["rm", "-f", &container_name]).await;

        run_docker(&["run", "-d", "--name", &container_name, &spec.artifact]).await?;

        self.containers
            .lock()
            .insert(spec.name.clone(), ContainerHandle { container_name });
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        let container_name = self
            .containers
            .lock()
            .get(name)
            .map(|h| h.container_name.clone())
            .unwrap_or_else(|| Self::container_name(name));

        tracing::info!(component = %name, %container_name, "stopping container");
        // `docker stop` already does SIGTERM-then-grace-then-SIGKILL; pass
        // the same 5s grace the containerd plugin uses.
        let timeout_arg = STOP_GRACE.as_secs().to_string();
        match run_docker(&["stop", "-t", &timeout_arg, &container_name]).await {
            Ok(_) => Ok(()),
            // Already stopped/removed — stopping a dead name must be safe.
            Err(RuntimeError::CommandFailed { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), RuntimeError> {
        let container_name = self
            .containers
            .lock()
            .remove(name)
            .map(|h| h.container_name)
            .unwrap_or_else(|| Self::container_name(name));

        tracing::info!(component = %name, %container_name, "deleting container");
        // `docker rm -f` is safe to call on an already-deleted name: it
        // simply errors, which we swallow (§4.10, "safe to call on an
        // already-deleted name").
        let _ = run_docker(&["rm", "-f", &container_name]).await;
        Ok(())
    }

    async fn status(&self, name: &str) -> Result<ComponentStatus, RuntimeError> {
        let container_name = self
            .containers
            .lock()
            .get(name)
            .map(|h| h.container_name.clone())
            .unwrap_or_else(|| Self::container_name(name));

        let output = tokio::process::Command::new("docker")
            .args(["inspect", "--format", "{{.State.Status}}", &container_name])
            .output()
            .await
            .map_err(|source| RuntimeError::Exec { cmd: "docker inspect", source })?;

        if !output.status.success() {
            return Ok(ComponentStatus {
                name: name.to_string(),
                state: TaskState::NotFound,
                message: format!("container {container_name} not found"),
            });
        }

        let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let state = match raw.as_str() {
            "created" => TaskState::Created,
            "running" => TaskState::Running,
            "exited" | "dead" => TaskState::Stopped,
            "paused" => TaskState::Paused,
            _ => TaskState::Unknown,
        };
        Ok(ComponentStatus {
            name: name.to_string(),
            state,
            message: format!("docker container {container_name} state={raw}"),
        })
    }
}

/// Run the `docker` CLI and return stdout on success.
async fn run_docker(args: &[&str]) -> Result<String, RuntimeError> {
    let output = tokio::process::Command::new("docker")
        .args(args)
        .output()
        .await
        .map_err(|source| RuntimeError::Exec { cmd: "docker", source })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(RuntimeError::CommandFailed {
            cmd: "docker",
            target: args.first().copied().unwrap_or("").to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
