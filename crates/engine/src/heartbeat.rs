// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Heartbeat Monitor (§4.5). Grounded on
//! `original_source/internal/lo/heartbeat/host-monitor.go`: an in-memory
//! `{last_seen, misses, status}` table mirrored to the state store, a single
//! mutex guarding both the update path and the scan tick so a heartbeat
//! racing a scan can never be lost (§4.5, "Ordering guarantee").

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use eoc_core::{Clock, Host, HostId, HostStatus};
use eoc_store::StateStore;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;

const DEFAULT_EXPECTED_EVERY: Duration = Duration::from_secs(10);
const DEFAULT_MAX_MISSES: u32 = 3;

struct HostTrack {
    last_seen_ms: u64,
    misses: u32,
    status: HostStatus,
}

/// Callbacks invoked on host liveness transitions. The reconciler wires
/// `on_recovery` to re-trigger reconcile for deployments targeting the
/// recovered host (§8, "Host lifecycle").
pub trait HeartbeatCallbacks: Send + Sync {
    fn on_recovery(&self, host_id: HostId);
    fn on_dead(&self, host_id: HostId);
}

/// A no-op [`HeartbeatCallbacks`] for callers that don't need transition
/// hooks (e.g. exercising [`HeartbeatMonitor`] in isolation).
#[derive(Default)]
pub struct NoopCallbacks;

impl HeartbeatCallbacks for NoopCallbacks {
    fn on_recovery(&self, _host_id: HostId) {}
    fn on_dead(&self, _host_id: HostId) {}
}

/// Per-host liveness tracker, mirrored into the state store on every
/// transition (§4.5).
pub struct HeartbeatMonitor<C: Clock> {
    clock: C,
    store: StateStore,
    callbacks: Arc<dyn HeartbeatCallbacks>,
    expected_every: Duration,
    max_misses: u32,
    hosts: Mutex<HashMap<HostId, HostTrack>>,
}

impl<C: Clock> HeartbeatMonitor<C> {
    pub fn new(clock: C, store: StateStore, callbacks: Arc<dyn HeartbeatCallbacks>) -> Self {
        Self::with_thresholds(clock, store, callbacks, DEFAULT_EXPECTED_EVERY, DEFAULT_MAX_MISSES)
    }

    pub fn with_thresholds(
        clock: C,
        store: StateStore,
        callbacks: Arc<dyn HeartbeatCallbacks>,
        expected_every: Duration,
        max_misses: u32,
    ) -> Self {
        Self {
            clock,
            store,
            callbacks,
            expected_every,
            max_misses,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Record a received heartbeat for `host_id` (§4.5).
    pub async fn record_heartbeat(&self, host_id: HostId) -> Result<(), EngineError> {
        let now = self.clock.epoch_ms();
        let recovered = {
            let mut hosts = self.hosts.lock();
            match hosts.get_mut(&host_id) {
                None => {
                    hosts.insert(
                        host_id,
                        HostTrack { last_seen_ms: now, misses: 0, status: HostStatus::Alive },
                    );
                    false
                }
                Some(track) => {
                    let was_dead = track.status == HostStatus::Dead;
                    track.last_seen_ms = now;
                    track.misses = 0;
                    track.status = HostStatus::Alive;
                    was_dead
                }
            }
        };

        let host = self
            .store
            .load_host(&host_id)?
            .unwrap_or_else(|| Host::new(host_id, now))
            .with_alive(now);
        self.store.add_or_update_host(&host).await?;

        if recovered {
            tracing::info!(host_id = %host_id, "host recovered");
            self.callbacks.on_recovery(host_id);
        }
        Ok(())
    }

    /// Scan every tracked host; increment misses for any alive host whose
    /// last heartbeat is overdue, and declare dead once `max_misses` is hit
    /// (§4.5).
    pub async fn scan(&self) -> Result<(), EngineError> {
        let now = self.clock.epoch_ms();
        let expected_ms = self.expected_every.as_millis() as u64;

        let newly_dead: Vec<HostId> = {
            let mut hosts = self.hosts.lock();
            let mut dead = Vec::new();
            for (host_id, track) in hosts.iter_mut() {
                if track.status == HostStatus::Dead {
                    continue;
                }
                if now.saturating_sub(track.last_seen_ms) > expected_ms {
                    track.misses += 1;
                    tracing::warn!(host_id = %host_id, misses = track.misses, max = self.max_misses, "heartbeat miss");
                    if track.misses >= self.max_misses {
                        track.status = HostStatus::Dead;
                        dead.push(*host_id);
                    }
                }
            }
            dead
        };

        for host_id in &newly_dead {
            let misses = {
                let hosts = self.hosts.lock();
                hosts.get(host_id).map(|t| t.misses).unwrap_or(self.max_misses)
            };
            if let Some(host) = self.store.load_host(host_id)? {
                let mut host = host;
                host.alive = false;
                host.status = HostStatus::Dead;
                host.misses = misses;
                self.store.add_or_update_host(&host).await?;
            }
            tracing::error!(host_id = %host_id, "host declared dead");
            self.callbacks.on_dead(*host_id);
        }
        Ok(())
    }

    /// Run the scan ticker until `cancel` fires (§5, "long-lived workers").
    pub async fn run(self: Arc<Self>, cancel: CancellationToken)
    where
        C: 'static,
    {
        let mut ticker = tokio::time::interval(self.expected_every);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("heartbeat monitor shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.scan().await {
                        tracing::error!(error = %e, "heartbeat scan failed");
                    }
                }
            }
        }
    }
}

trait HostExt {
    fn with_alive(self, last_seen_ms: u64) -> Host;
}

impl HostExt for Host {
    fn with_alive(mut self, last_seen_ms: u64) -> Host {
        self.alive = true;
        self.status = HostStatus::Alive;
        self.misses = 0;
        self.last_seen = last_seen_ms;
        self
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
