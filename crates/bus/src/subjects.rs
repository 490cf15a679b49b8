// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Literal subject conventions (§4.2, §6) — an external compatibility
//! surface, not an implementation detail. Grounded on
//! `original_source/internal/lo/actuators/nats_actuator.go` (deploy
//! subject) and `internal/era/heartbeat/heartbeat.go` (health subject).

/// Periodic heartbeat from ERA: `health.<site_id>.<host_id>`.
pub fn health_subject(site_id: &str, host_id: &str) -> String {
    format!("health.{site_id}.{host_id}")
}

/// LO -> ERA op dispatch: `site.<site_id>.deploy.<host_id>`.
pub fn deploy_subject(site_id: &str, host_id: &str) -> String {
    format!("site.{site_id}.deploy.{host_id}")
}

/// ERA -> LO status for one host: `status.<site_id>.<host_id>`.
pub fn status_subject(site_id: &str, host_id: &str) -> String {
    format!("status.{site_id}.{host_id}")
}

/// LO-side subscription pattern covering every host's status in a site:
/// `status.<site_id>.*`.
pub fn status_wildcard(site_id: &str) -> String {
    format!("status.{site_id}.*")
}

#[cfg(test)]
#[path = "subjects_tests.rs"]
mod tests;
