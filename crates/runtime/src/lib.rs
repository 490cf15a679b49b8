// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable execution backends for the Edge Runtime Agent (§4.10).
//!
//! A [`RuntimePlugin`] implements the install/start/stop/delete/status
//! contract for one execution technology; a [`PluginRegistry`] holds the
//! set available to one ERA process, keyed by name.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod container;
mod error;
mod registry;
mod spec;
mod traits;
mod wasm;

#[cfg(any(test, feature = "test-support"))]
mod mock;

pub use container::ContainerBackend;
pub use error::RuntimeError;
pub use registry::PluginRegistry;
pub use spec::{ComponentSpec, ComponentStatus, TaskState};
pub use traits::RuntimePlugin;
pub use wasm::WasmBackend;

#[cfg(any(test, feature = "test-support"))]
pub use mock::MockBackend;
