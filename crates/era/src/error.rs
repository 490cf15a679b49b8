// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Top-level error for the ERA binary. Lower-layer errors are folded in via
/// `#[from]`; this type only exists at the process boundary (wiring,
/// config, registration HTTP).
#[derive(Debug, Error)]
pub enum EraError {
    #[error(transparent)]
    Bus(#[from] eoc_bus::BusError),

    #[error(transparent)]
    Runtime(#[from] eoc_runtime::RuntimeError),

    #[error("registration with LO failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine a state directory (no home directory)")]
    NoStateDir,

    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("registration handshake failed: {0}")]
    Registration(String),
}
