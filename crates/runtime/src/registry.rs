// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide plugin registry (§4.10, §9 "Plugin registry as process-wide
//! state"). Populated at process init via explicit [`PluginRegistry::register`]
//! calls — no implicit auto-loading — and the active plugin for one ERA
//! instance is selected by name from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RuntimeError;
use crate::traits::RuntimePlugin;

/// A registry of available runtime plugins, keyed by name. Construct one
/// per ERA process, register every built-in plugin, then [`get`][Self::get]
/// the one selected by configuration.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: HashMap<&'static str, Arc<dyn RuntimePlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Arc<dyn RuntimePlugin>) {
        self.plugins.insert(plugin.name(), plugin);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn RuntimePlugin>, RuntimeError> {
        self.plugins.get(name).cloned().ok_or_else(|| RuntimeError::UnknownPlugin(name.to_string()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.keys().copied().collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
