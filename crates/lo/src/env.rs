// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the LO binary (§6).

use std::path::PathBuf;
use std::time::Duration;

use eoc_core::SiteId;

use crate::error::LoError;

/// Resolve the LO state directory: `LO_STATE_DIR` > `$HOME/.lo`.
pub fn state_dir() -> Result<PathBuf, LoError> {
    if let Ok(dir) = std::env::var("LO_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").map_err(|_| LoError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".lo"))
}

/// Load the site id from `SITE_ID`, or load-or-create one persisted under
/// the state directory (mirrors `loadOrCreateID` in the original's ERA
/// `main.go`, reused here for the LO's own identity).
pub fn site_id(state_dir: &std::path::Path) -> Result<SiteId, LoError> {
    if let Ok(raw) = std::env::var("SITE_ID") {
        return Ok(SiteId::from_string(raw));
    }
    let path = state_dir.join("site_id");
    if let Ok(existing) = std::fs::read_to_string(&path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return Ok(SiteId::from_string(trimmed));
        }
    }
    let id = SiteId::new();
    std::fs::create_dir_all(state_dir)?;
    std::fs::write(&path, id.as_str())?;
    Ok(id)
}

/// NATS server URL (§6).
pub fn nats_url() -> String {
    std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string())
}

/// Central Orchestrator base URL the `CoForwarder` posts status reports to.
pub fn co_url() -> String {
    std::env::var("CO_URL").unwrap_or_else(|_| "http://localhost:8080/api/v1".to_string())
}

/// Git repository URL polled for desired state (§4.3).
pub fn repo_url() -> Option<String> {
    std::env::var("REPO").ok()
}

/// Optional bearer token for authenticated git fetches.
pub fn github_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN").ok().filter(|s| !s.is_empty())
}

/// HTTP listen port for the LO's own admission API (§6).
pub fn http_port() -> u16 {
    std::env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(8081)
}

/// Git poll interval override (default: `eoc_engine::DEFAULT_POLL_INTERVAL`).
pub fn git_poll_interval() -> Option<Duration> {
    std::env::var("GIT_POLL_INTERVAL_MS").ok().and_then(|s| s.parse().ok()).map(Duration::from_millis)
}

/// Heartbeat expected-interval override (default: 10s, §4.5).
pub fn heartbeat_expected_every() -> Option<Duration> {
    std::env::var("HEARTBEAT_EXPECTED_MS").ok().and_then(|s| s.parse().ok()).map(Duration::from_millis)
}

/// Heartbeat max-misses-before-dead override (default: 3, §4.5).
pub fn heartbeat_max_misses() -> Option<u32> {
    std::env::var("HEARTBEAT_MAX_MISSES").ok().and_then(|s| s.parse().ok())
}
