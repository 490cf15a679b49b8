// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! eoc-engine: the reconciliation brain shared by the LO and ERA binaries —
//! diffing, heartbeats, desired-state intake, actuation, and the ERA-side
//! lifecycle controller (§4.3-§4.9).

mod actuator;
mod diff;
mod dispatcher;
mod error;
mod git;
mod heartbeat;
mod lifecycle;
mod manifest;
mod reconciler;

pub use actuator::{Actuator, CoForwarder, NoopForwarder};
pub use diff::compute_diff;
pub use dispatcher::{
    channel, channel_with_capacity, parse_manifest, Dispatcher, EngineEvent, EventSender,
};
pub use error::EngineError;
pub use git::{DeploymentChange, GitPoller, ResourceFetcher, DEFAULT_POLL_INTERVAL};
pub use heartbeat::{HeartbeatCallbacks, HeartbeatMonitor, NoopCallbacks};
pub use lifecycle::LifecycleController;
pub use manifest::{
    ApplicationDeployment, DeploymentProfile, ManifestAnnotations, ManifestComponent,
    ManifestComponentProperties, ManifestMetadata, ManifestSpec, parse_application_deployment,
};
pub use reconciler::Reconciler;
