// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LO admission HTTP surface (§6, "LO HTTP"). Grounded on the teacher's
//! axum `Router<AppState>` pattern (see `examples/open-telemetry-otel-arrow`'s
//! `admin::health` module for the shape this mirrors) and on
//! `daemon::lifecycle::startup`'s ordered bring-up for when this server
//! comes up relative to the rest of the process.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use eoc_core::{Clock, Host, HostId, SiteId};
use eoc_engine::HeartbeatMonitor;
use eoc_store::StateStore;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct AppState<C: Clock> {
    pub store: StateStore,
    pub site_id: SiteId,
    pub heartbeat: Arc<HeartbeatMonitor<C>>,
}

/// Build the LO's admission router (§6): `/healthz`, `/hosts`, `/actual`,
/// `/register`.
pub fn router<C: Clock + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/hosts", get(hosts::<C>))
        .route("/actual", get(actual::<C>))
        .route("/register", post(register::<C>))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn hosts<C: Clock>(
    State(state): State<AppState<C>>,
) -> Result<Json<BTreeMap<HostId, Host>>, StatusCode> {
    let hosts = state.store.load_all_hosts().map_err(|e| {
        tracing::error!(error = %e, "failed to load hosts");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(hosts.into_iter().map(|h| (h.id, h)).collect()))
}

async fn actual<C: Clock>(
    State(state): State<AppState<C>>,
) -> Result<Json<eoc_core::ActualState>, StatusCode> {
    state.store.get_actual().map(Json).map_err(|e| {
        tracing::error!(error = %e, "failed to load actual state");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

#[derive(Deserialize)]
struct RegisterRequest {
    host_id: String,
}

/// `POST /register`: treated as an initial heartbeat (§3, "Host: created on
/// first heartbeat or registration") — it drives the same liveness path a
/// periodic heartbeat would, then returns this LO's site id so the caller
/// can address its own heartbeat/status subjects.
async fn register<C: Clock>(
    State(state): State<AppState<C>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<String>, StatusCode> {
    let host_id = HostId::from_string(req.host_id);
    state.heartbeat.record_heartbeat(host_id).await.map_err(|e| {
        tracing::error!(error = %e, "failed to register host");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(state.site_id.to_string()))
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
