// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Top-level error for the LO binary. Lower-layer errors are folded in via
/// `#[from]`; this type only exists at the process boundary (wiring,
/// config, HTTP) — library crates keep their own error types.
#[derive(Debug, Error)]
pub enum LoError {
    #[error(transparent)]
    Store(#[from] eoc_store::StoreError),

    #[error(transparent)]
    Bus(#[from] eoc_bus::BusError),

    #[error(transparent)]
    Engine(#[from] eoc_engine::EngineError),

    #[error("git fetch failed: {0}")]
    Git(String),

    #[error("state directory already locked by another LO process: {0}")]
    LockHeld(std::path::PathBuf),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine a state directory (HOME not set)")]
    NoStateDir,
}
