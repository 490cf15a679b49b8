// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Edge Runtime Agent binary (§4, §6). Registers every built-in
//! [`eoc_runtime::RuntimePlugin`], selects the one this host runs,
//! registers with the LO, and runs the deploy dispatcher and heartbeat
//! publisher until a shutdown signal arrives.

use std::sync::Arc;

use eoc_bus::NatsBus;
use eoc_engine::LifecycleController;
use eoc_era::{dispatcher, env, error::EraError, heartbeat, registration};
use eoc_runtime::{ContainerBackend, PluginRegistry, WasmBackend};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), EraError> {
    tracing_subscriber::fmt::init();

    let state_dir = env::state_dir()?;
    std::fs::create_dir_all(&state_dir)?;
    let host_id = env::host_id(&state_dir)?;

    let http_client = reqwest::Client::new();
    // The registration handshake is how an ERA instance learns its own
    // site id (§11); fall back to a locally known one only if the LO is
    // unreachable at startup.
    let site_id = match registration::register(&http_client, &env::lo_url(), host_id).await {
        Ok(site_id) => {
            if let Err(e) = env::persist_site_id(&state_dir, site_id) {
                tracing::warn!(error = %e, "failed to persist site id from registration");
            }
            site_id
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to register with LO, falling back to known site id");
            env::site_id_fallback(&state_dir)?
        }
    };
    tracing::info!(site_id = %site_id, host_id = %host_id, "starting ERA");

    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(ContainerBackend::default()));
    registry.register(Arc::new(WasmBackend::new()));

    let plugin_name = env::runtime_plugin();
    let plugin = registry.get(&plugin_name)?;
    let runtime_name: &'static str = match plugin_name.as_str() {
        "containerd" => "containerd",
        "wasm" => "wasm",
        _ => "unknown",
    };
    let controller = Arc::new(LifecycleController::new(plugin));

    let bus = Arc::new(NatsBus::connect(&env::nats_url()).await?);

    let _deploy_subscription = dispatcher::run(bus.clone(), site_id, host_id, controller).await?;

    let cancel = CancellationToken::new();
    let heartbeat_handle = tokio::spawn(heartbeat::run(
        bus.clone(),
        site_id,
        host_id,
        env::heartbeat_interval(),
        runtime_name,
        cancel.clone(),
    ));

    wait_for_shutdown_signal().await;
    cancel.cancel();
    let _ = heartbeat_handle.await;
    tracing::info!("ERA shut down");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        let Ok(mut sigterm) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) else {
            return;
        };
        sigterm.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
