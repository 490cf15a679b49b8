// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The data model (§3): Host, desired App/Component, actual-state mirror,
//! DiffOp, and DeploymentStatus. Maps that the diff engine iterates use
//! `BTreeMap` rather than `HashMap` so that iteration order is
//! deterministic — required for byte-identical diff output (§4.6,
//! "Determinism").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::define_id;

define_id! {
    /// Self-generated, persisted, never-rotated host identity (§6).
    pub struct HostId;
}

define_id! {
    /// Self-generated, persisted, never-rotated per-site identity (§6).
    pub struct SiteId;
}

/// An externally-sourced identifier (deployment id, app id, component name)
/// read from Git-managed YAML. Unlike [`HostId`]/[`SiteId`] these are never
/// generated locally, so they are plain string newtypes rather than
/// `define_id!` wrappers.
macro_rules! define_ext_id {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_ext_id! {
    /// Deployment identifier, taken from the YAML manifest's
    /// `metadata.annotations.id`.
    pub struct DeploymentId;
}

define_ext_id! {
    /// Application identifier, taken from the YAML manifest's
    /// `metadata.annotations.applicationId`.
    pub struct AppId;
}

define_ext_id! {
    /// Component name, unique within an App.
    pub struct ComponentName;
}

/// Liveness status of a host, driven entirely by the Heartbeat Monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Alive,
    Dead,
}

crate::simple_display! {
    HostStatus {
        Alive => "alive",
        Dead => "dead",
    }
}

/// A fleet host. Created on first heartbeat or registration; mutated only
/// by the Heartbeat Monitor and the registration handler; never destroyed
/// (marked dead instead) — §3 "Lifecycles".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub id: HostId,
    pub alive: bool,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Epoch milliseconds of the last received heartbeat.
    pub last_seen: u64,
    pub misses: u32,
    pub status: HostStatus,
}

impl Host {
    pub fn new(id: HostId, last_seen: u64) -> Self {
        Self {
            id,
            alive: true,
            labels: BTreeMap::new(),
            last_seen,
            misses: 0,
            status: HostStatus::Alive,
        }
    }

    /// True if every entry in `selector` matches this host's labels —
    /// used to gate component placement (SPEC_FULL §11, `nodeMatches`).
    pub fn matches_selector(&self, selector: &BTreeMap<String, String>) -> bool {
        selector
            .iter()
            .all(|(k, v)| self.labels.get(k).is_some_and(|hv| hv == v))
    }
}

/// A desired component, as declared in the Git-managed deployment manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: ComponentName,
    pub version: String,
    pub repository: String,
    pub package_url: String,
    pub key_url: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub node_selector: BTreeMap<String, String>,
}

/// The canonical desired application, parsed from the Git deployment
/// manifest by the Desired Intake (§4.4).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct App {
    pub id: AppId,
    pub version: String,
    pub dep_type: String,
    pub components: BTreeMap<ComponentName, Component>,
}

impl App {
    /// An empty App with `id == ""` signals "remove everything for this
    /// deployment" to the diff engine (§4.6, step 1).
    pub fn is_removal_marker(&self) -> bool {
        self.id.is_empty()
    }
}

impl Default for AppId {
    fn default() -> Self {
        Self(String::new())
    }
}

impl Default for DeploymentId {
    fn default() -> Self {
        Self(String::new())
    }
}

impl Default for ComponentName {
    fn default() -> Self {
        Self(String::new())
    }
}

/// Per-component apply status, as observed on a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatusKind {
    Success,
    Failed,
    Pending,
}

crate::simple_display! {
    ComponentStatusKind {
        Success => "success",
        Failed => "failed",
        Pending => "pending",
    }
}

/// An observed component, mirrored into the state store by the Actuator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualComponent {
    pub name: ComponentName,
    pub status: ComponentStatusKind,
    pub version: String,
    pub last_updated: u64,
    #[serde(default)]
    pub hash: String,
}

/// An observed application on one host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActualApp {
    pub id: AppId,
    pub version: String,
    pub components: BTreeMap<ComponentName, ActualComponent>,
    /// Convergence hash: `canonical_hash` of the desired App this actual
    /// state was last made consistent with. Equality short-circuits the
    /// diff engine to a no-op (§4.6, step 3).
    #[serde(default)]
    pub hash: String,
}

/// All observed applications, indexed by host then app id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActualState {
    pub apps_by_host: BTreeMap<HostId, BTreeMap<AppId, ActualApp>>,
}

impl ActualState {
    pub fn apps_for_host(&self, host: &HostId) -> Option<&BTreeMap<AppId, ActualApp>> {
        self.apps_by_host.get(host)
    }
}

/// The tagged action variant a [`DiffOp`] carries (§3, §9 "Dispatch by
/// action"). Every consumer switching on this must handle every variant —
/// there is no wildcard arm anywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    AddApp,
    UpdateApp,
    RemoveApp,
    AddComp,
    UpdateComp,
    RemoveComp,
}

crate::simple_display! {
    Action {
        AddApp => "add_app",
        UpdateApp => "update_app",
        RemoveApp => "remove_app",
        AddComp => "add_comp",
        UpdateComp => "update_comp",
        RemoveComp => "remove_comp",
    }
}

/// A single declarative action targeting one host (§3). `app` embeds a
/// full snapshot — the desired App for additive actions, or a copy of the
/// actual App being torn down for removals — so the Actuator and ERA never
/// need a second round-trip to the store to act on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffOp {
    pub action: Action,
    pub site_id: SiteId,
    pub host_id: HostId,
    pub app: App,
    #[serde(default)]
    pub comp_name: Option<ComponentName>,
    pub deployment_id: DeploymentId,
    #[serde(default)]
    pub status: Option<ComponentStatusKind>,
    /// Nanosecond timestamp, also half of the operations-journal key
    /// (`deployment_id-timestamp`, §3).
    pub timestamp: u128,
}

impl DiffOp {
    /// The operations-journal key for this op: `<deployment_id>-<timestamp>`.
    pub fn journal_key(&self) -> String {
        format!("{}-{}", self.deployment_id, self.timestamp)
    }
}

/// Overall deployment state, derived from component states by precedence
/// `failed > installing > pending > installed` (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallState {
    Installed,
    Pending,
    Installing,
    Failed,
}

crate::simple_display! {
    OverallState {
        Installed => "installed",
        Pending => "pending",
        Installing => "installing",
        Failed => "failed",
    }
}

impl OverallState {
    /// Fold component states into one overall state by precedence.
    /// An empty component list is vacuously `Installed`.
    pub fn from_components(states: impl IntoIterator<Item = OverallState>) -> Self {
        states.into_iter().max().unwrap_or(OverallState::Installed)
    }
}

/// Runtime lifecycle state machine for one component, applied by the
/// Lifecycle Controller (§4.9): `None -> Installed -> Running -> Stopped
/// -> None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    None,
    Installed,
    Running,
    Stopped,
    Failed,
}

crate::simple_display! {
    ComponentState {
        None => "none",
        Installed => "installed",
        Running => "running",
        Stopped => "stopped",
        Failed => "failed",
    }
}

/// One component's contribution to a [`DeploymentStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub name: ComponentName,
    pub state: OverallState,
    #[serde(default)]
    pub error: Option<String>,
}

/// ERA → LO (and LO → CO) status report for one deployment (§3, §4.11).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub deployment_id: DeploymentId,
    pub timestamp: u128,
    pub state: OverallState,
    #[serde(default)]
    pub error: Option<String>,
    pub components: Vec<ComponentStatus>,
}

impl DeploymentStatus {
    pub fn new(deployment_id: DeploymentId, timestamp: u128, components: Vec<ComponentStatus>) -> Self {
        let state = OverallState::from_components(components.iter().map(|c| c.state));
        let error = components
            .iter()
            .find(|c| c.state == OverallState::Failed)
            .and_then(|c| c.error.clone());
        Self { deployment_id, timestamp, state, error, components }
    }
}

/// ERA -> LO periodic heartbeat payload (§6, `health.<site_id>.<host_id>`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatMessage {
    pub node_id: HostId,
    pub site_id: SiteId,
    pub cpu_percent: f64,
    pub mem_mb: u64,
    pub timestamp: u64,
    pub runtime: String,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
