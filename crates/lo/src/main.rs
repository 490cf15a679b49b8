// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Local Orchestrator binary (§4, §6). Brings up the state store, the
//! bus, the reconciliation pipeline, the heartbeat monitor, and the
//! admission HTTP surface, then runs until a shutdown signal arrives.
//! Bring-up order follows the teacher's
//! `daemon::lifecycle::startup`: acquire an exclusive lock on the state
//! directory first, then create the rest, and clean up anything this
//! process created if bring-up fails partway through.

use std::sync::Arc;

use eoc_bus::NatsBus;
use eoc_core::{HeartbeatMessage, HostId, SystemClock};
use eoc_engine::{
    channel, Actuator, Dispatcher, GitPoller, HeartbeatCallbacks, HeartbeatMonitor, NoopForwarder,
    Reconciler,
};
use eoc_lo::{co_forwarder::HttpCoForwarder, env, error::LoError, git_fetcher, http};
use eoc_store::StateStore;
use fs2::FileExt;
use tokio_util::sync::CancellationToken;

/// Ties a host's recovery to re-reconciling every deployment with desired
/// state, so work pending since before it died is re-dispatched (§8, "Host
/// lifecycle: flap").
struct ReconcileOnRecovery<B: eoc_bus::MessageBus, C: eoc_core::Clock> {
    store: StateStore,
    reconciler: Arc<Reconciler<B, C>>,
}

impl<B: eoc_bus::MessageBus + 'static, C: eoc_core::Clock + 'static> HeartbeatCallbacks
    for ReconcileOnRecovery<B, C>
{
    fn on_recovery(&self, _host_id: HostId) {
        let Ok(ops) = self.store.load_all_operations() else { return };
        let mut seen = std::collections::HashSet::new();
        for op in ops {
            if seen.insert(op.deployment_id.clone()) {
                let reconciler = self.reconciler.clone();
                let deployment_id = op.deployment_id;
                tokio::spawn(async move {
                    if let Err(e) = reconciler.reconcile(&deployment_id).await {
                        tracing::error!(deployment_id = %deployment_id, error = %e, "recovery reconcile failed");
                    }
                });
            }
        }
    }

    fn on_dead(&self, _host_id: HostId) {}
}

#[tokio::main]
async fn main() -> Result<(), LoError> {
    tracing_subscriber::fmt::init();

    let state_dir = env::state_dir()?;
    std::fs::create_dir_all(&state_dir)?;

    let lock_path = state_dir.join("lo.lock");
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)?;
    if lock_file.try_lock_exclusive().is_err() {
        return Err(LoError::LockHeld(lock_path));
    }

    if let Err(e) = run(&state_dir).await {
        tracing::error!(error = %e, "LO exiting with error");
        let _ = std::fs::remove_file(&lock_path);
        return Err(e);
    }
    let _ = std::fs::remove_file(&lock_path);
    Ok(())
}

async fn run(state_dir: &std::path::Path) -> Result<(), LoError> {
    let site_id = env::site_id(state_dir)?;
    tracing::info!(site_id = %site_id, "starting LO");

    let store = StateStore::open(state_dir.join("store"))?;
    let bus = Arc::new(NatsBus::connect(&env::nats_url()).await?);

    let forwarder: Arc<dyn eoc_engine::CoForwarder> = match env::co_url().is_empty() {
        true => Arc::new(NoopForwarder),
        false => Arc::new(HttpCoForwarder::new(env::co_url())),
    };

    let actuator = Arc::new(Actuator::new(site_id, bus.clone(), store.clone(), forwarder));
    let _status_subscription = actuator.clone().run().await?;

    let reconciler = Arc::new(Reconciler::new(site_id, SystemClock, store.clone(), actuator.clone()));

    let heartbeat_callbacks = Arc::new(ReconcileOnRecovery { store: store.clone(), reconciler: reconciler.clone() });
    let expected_every = env::heartbeat_expected_every().unwrap_or(std::time::Duration::from_secs(10));
    let max_misses = env::heartbeat_max_misses().unwrap_or(3);
    let heartbeat = Arc::new(HeartbeatMonitor::with_thresholds(
        SystemClock,
        store.clone(),
        heartbeat_callbacks,
        expected_every,
        max_misses,
    ));

    let cancel = CancellationToken::new();

    let (events_tx, events_rx) = channel();
    let dispatcher = Dispatcher::new(store.clone(), reconciler.clone());
    tokio::spawn(dispatcher.run(events_rx, cancel.clone()));

    if let Some(repo) = env::repo_url() {
        spawn_git_poller(repo, events_tx, cancel.clone());
    } else {
        tracing::warn!("REPO not set, git polling disabled");
    }

    tokio::spawn(heartbeat.clone().run(cancel.clone()));

    let heartbeat_for_bus = heartbeat.clone();
    let health_pattern = eoc_bus::health_subject(&site_id.to_string(), "*");
    let _health_subscription = bus
        .subscribe::<HeartbeatMessage, _>(&health_pattern, move |msg| {
            let heartbeat = heartbeat_for_bus.clone();
            tokio::spawn(async move {
                if let Err(e) = heartbeat.record_heartbeat(msg.node_id).await {
                    tracing::error!(error = %e, "failed to record heartbeat");
                }
            });
        })
        .await?;

    let app_state = http::AppState { store, site_id, heartbeat };
    let router = http::router(app_state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", env::http_port())).await?;
    tracing::info!(port = env::http_port(), "LO admission API listening");

    let server_cancel = cancel.clone();
    let serve_fut = axum::serve(listener, router).with_graceful_shutdown(async move {
        wait_for_shutdown_signal().await;
        server_cancel.cancel();
    });

    serve_fut.await?;
    tracing::info!("LO shut down");
    Ok(())
}

fn spawn_git_poller(repo: String, events_tx: eoc_engine::EventSender, cancel: CancellationToken) {
    tokio::spawn(async move {
        if let Some((owner_repo, dir)) = repo.split_once('#') {
            let poller = GitPoller::new(
                git_fetcher::GitHubFetcher::new(owner_repo.to_string(), dir.to_string(), env::github_token()),
                events_tx,
            );
            let poller = match env::git_poll_interval() {
                Some(interval) => poller.with_interval(interval),
                None => poller,
            };
            poller.run(cancel).await;
        } else {
            let poller = GitPoller::new(git_fetcher::LocalPathFetcher::new(repo), events_tx);
            let poller = match env::git_poll_interval() {
                Some(interval) => poller.with_interval(interval),
                None => poller,
            };
            poller.run(cancel).await;
        }
    });
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
