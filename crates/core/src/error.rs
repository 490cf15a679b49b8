// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared across crate boundaries that deal directly with the
//! data model (parsing, validation). Transport- and storage-specific errors
//! live in their own crates (`eoc-store::StoreError`, `eoc-bus::BusError`,
//! `eoc-runtime::RuntimeError`, `eoc-engine::EngineError`).

use thiserror::Error;

/// Errors raised while building or validating a core data-model value.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("deployment manifest is missing required field: {0}")]
    MissingField(&'static str),

    #[error("deployment manifest has invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}
