// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WASM runtime plugin. Registered under the name `"wasm"` so the plugin
//! registry and configuration surface it, but every operation returns
//! [`RuntimeError::Unsupported`] — per the Open Question #5 decision in
//! DESIGN.md, a WASM backend has no grounding in either the teacher repo
//! or the example pack, so it is stubbed rather than invented.

use async_trait::async_trait;

use crate::error::RuntimeError;
use crate::spec::{ComponentSpec, ComponentStatus};
use crate::traits::RuntimePlugin;

#[derive(Debug, Clone, Copy, Default)]
pub struct WasmBackend;

impl WasmBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RuntimePlugin for WasmBackend {
    fn name(&self) -> &'static str {
        "wasm"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &[]
    }

    async fn install(&self, _spec: &ComponentSpec) -> Result<(), RuntimeError> {
        Err(RuntimeError::Unsupported("wasm install"))
    }

    async fn start(&self, _spec: &ComponentSpec) -> Result<(), RuntimeError> {
        Err(RuntimeError::Unsupported("wasm start"))
    }

    async fn stop(&self, _name: &str) -> Result<(), RuntimeError> {
        Err(RuntimeError::Unsupported("wasm stop"))
    }

    async fn delete(&self, _name: &str) -> Result<(), RuntimeError> {
        Err(RuntimeError::Unsupported("wasm delete"))
    }

    async fn status(&self, _name: &str) -> Result<ComponentStatus, RuntimeError> {
        Err(RuntimeError::Unsupported("wasm status"))
    }
}

#[cfg(test)]
#[path = "wasm_tests.rs"]
mod tests;
