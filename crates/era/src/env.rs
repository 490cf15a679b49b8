// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the ERA binary (§6).

use std::path::PathBuf;
use std::time::Duration;

use eoc_core::{HostId, SiteId};

use crate::error::EraError;

/// Resolve the ERA state directory: `ERA_STATE_DIR` > `$HOME/.era`.
pub fn state_dir() -> Result<PathBuf, EraError> {
    if let Ok(dir) = std::env::var("ERA_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir().map(|h| h.join(".era")).ok_or(EraError::NoStateDir)
}

/// Load-or-create this host's persistent identity under the state
/// directory. Mirrors `loadOrCreateID` in the original's ERA `main.go`.
pub fn host_id(state_dir: &std::path::Path) -> Result<HostId, EraError> {
    if let Ok(raw) = std::env::var("HOST_ID") {
        return Ok(HostId::from_string(raw));
    }
    let path = state_dir.join("host_id");
    if let Ok(existing) = std::fs::read_to_string(&path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return Ok(HostId::from_string(trimmed));
        }
    }
    let id = HostId::new();
    std::fs::create_dir_all(state_dir)?;
    std::fs::write(&path, id.as_str())?;
    Ok(id)
}

/// The site this ERA instance belongs to, when known ahead of the
/// registration handshake (§3, "a host belongs to one site"): `SITE_ID` if
/// set, else whatever the last successful registration persisted under the
/// state directory (§11, "persisting the returned site id alongside its
/// host id file"). The registration handshake itself (§11) is the primary
/// source of truth; this is only the fallback used when it fails.
pub fn site_id_fallback(state_dir: &std::path::Path) -> Result<SiteId, EraError> {
    if let Ok(raw) = std::env::var("SITE_ID") {
        return Ok(SiteId::from_string(raw));
    }
    let existing = std::fs::read_to_string(site_id_path(state_dir)).map_err(|_| EraError::MissingConfig("SITE_ID"))?;
    let trimmed = existing.trim();
    if trimmed.is_empty() {
        return Err(EraError::MissingConfig("SITE_ID"));
    }
    Ok(SiteId::from_string(trimmed))
}

/// Where the site id returned by a successful registration handshake is
/// persisted, alongside the host id file (§11).
pub fn site_id_path(state_dir: &std::path::Path) -> PathBuf {
    state_dir.join("site_id")
}

/// Persist `site_id` under the state directory so future restarts can fall
/// back to it if the LO is unreachable at startup (§11).
pub fn persist_site_id(state_dir: &std::path::Path, site_id: SiteId) -> Result<(), EraError> {
    std::fs::create_dir_all(state_dir)?;
    std::fs::write(site_id_path(state_dir), site_id.as_str())?;
    Ok(())
}

/// NATS server URL (§6).
pub fn nats_url() -> String {
    std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string())
}

/// The LO's admission API base URL, used for the startup registration
/// handshake (§6, `POST /register`).
pub fn lo_url() -> String {
    std::env::var("LO_URL").unwrap_or_else(|_| "http://localhost:8081".to_string())
}

/// Which registered [`eoc_runtime::RuntimePlugin`] this ERA instance runs
/// (§4.10, "one plugin per agent"). Defaults to the container backend.
pub fn runtime_plugin() -> String {
    std::env::var("ERA_RUNTIME").unwrap_or_else(|_| "containerd".to_string())
}

/// Heartbeat publish interval override (default: 10s, matching the LO's
/// default expected-interval, §4.5).
pub fn heartbeat_interval() -> Duration {
    std::env::var("HEARTBEAT_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_secs(10))
}
