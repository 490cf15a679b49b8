// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process mock backend for exercising the Lifecycle Controller without
//! a real container runtime (§4.10, "mock" plugin name; SPEC_FULL.md §10
//! test tooling). Mirrors the shape of [`crate::container::ContainerBackend`]
//! but keeps state purely in memory, guarded the same way.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::RuntimeError;
use crate::spec::{ComponentSpec, ComponentStatus, TaskState};
use crate::traits::RuntimePlugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockState {
    Installed,
    Running,
    Stopped,
}

/// An in-memory [`RuntimePlugin`] for tests. Optionally primed to fail a
/// named operation via [`MockBackend::fail_on`], for exercising the
/// lifecycle controller's `failed`-state handling.
#[derive(Clone, Default)]
pub struct MockBackend {
    components: Arc<Mutex<HashMap<String, MockState>>>,
    fail_on: Arc<Mutex<HashMap<String, &'static str>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call to `op` (one of "install", "start", "stop",
    /// "delete") for `name` return a [`RuntimeError::CommandFailed`].
    pub fn fail_on(&self, name: &str, op: &'static str) {
        self.fail_on.lock().insert(name.to_string(), op);
    }

    fn check_fail(&self, name: &str, op: &'static str) -> Result<(), RuntimeError> {
        let mut guard = self.fail_on.lock();
        if guard.get(name) == Some(&op) {
            guard.remove(name);
            return Err(RuntimeError::CommandFailed {
                cmd: op,
                target: name.to_string(),
                stderr: "mock-injected failure".to_string(),
            });
        }
        Ok(())
    }

    /// Snapshot of components currently tracked, for test assertions.
    pub fn installed_names(&self) -> Vec<String> {
        self.components.lock().keys().cloned().collect()
    }
}

#[async_trait]
impl RuntimePlugin for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["mock"]
    }

    async fn install(&self, spec: &ComponentSpec) -> Result<(), RuntimeError> {
        self.check_fail(&spec.name, "install")?;
        self.components.lock().insert(spec.name.clone(), MockState::Installed);
        Ok(())
    }

    async fn start(&self, spec: &ComponentSpec) -> Result<(), RuntimeError> {
        self.check_fail(&spec.name, "start")?;
        self.components.lock().insert(spec.name.clone(), MockState::Running);
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        self.check_fail(name, "stop")?;
        if let Some(state) = self.components.lock().get_mut(name) {
            *state = MockState::Stopped;
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), RuntimeError> {
        self.check_fail(name, "delete")?;
        self.components.lock().remove(name);
        Ok(())
    }

    async fn status(&self, name: &str) -> Result<ComponentStatus, RuntimeError> {
        let state = self.components.lock().get(name).copied();
        let (state, message) = match state {
            Some(MockState::Installed) => (TaskState::Created, "installed, not started".to_string()),
            Some(MockState::Running) => (TaskState::Running, "running".to_string()),
            Some(MockState::Stopped) => (TaskState::Stopped, "stopped".to_string()),
            None => (TaskState::NotFound, format!("{name} not tracked")),
        };
        Ok(ComponentStatus { name: name.to_string(), state, message })
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
