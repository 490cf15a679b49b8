// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by a [`crate::RuntimePlugin`] (§4.10, §7 "Runtime plugin
/// failure"). The lifecycle controller maps any of these to a `failed`
/// component state; it never advances the convergence hash on error.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to exec {cmd}: {source}")]
    Exec { cmd: &'static str, #[source] source: std::io::Error },

    #[error("{cmd} failed for {target}: {stderr}")]
    CommandFailed { cmd: &'static str, target: String, stderr: String },

    #[error("no plugin registered under name {0:?}")]
    UnknownPlugin(String),

    #[error("plugin {0:?} does not support this operation")]
    Unsupported(&'static str),
}
