// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic heartbeat publisher (§4.5, §6): posts a [`HeartbeatMessage`] on
//! `health.<site_id>.<host_id>` on a fixed tick until cancelled. Grounded on
//! `original_source/internal/era/heartbeat/heartbeat.go`'s publish loop.

use std::sync::Arc;
use std::time::Duration;

use eoc_bus::{health_subject, MessageBus};
use eoc_core::{HeartbeatMessage, HostId, SiteId};
use tokio_util::sync::CancellationToken;

/// Run the heartbeat publish ticker until `cancel` fires.
pub async fn run<B: MessageBus>(
    bus: Arc<B>,
    site_id: SiteId,
    host_id: HostId,
    interval: Duration,
    runtime_name: &'static str,
    cancel: CancellationToken,
) {
    let subject = health_subject(&site_id.to_string(), &host_id.to_string());
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("heartbeat publisher shutting down");
                return;
            }
            _ = ticker.tick() => {
                let msg = HeartbeatMessage {
                    node_id: host_id,
                    site_id,
                    cpu_percent: read_cpu_percent(),
                    mem_mb: read_mem_mb(),
                    timestamp: now_epoch_ms(),
                    runtime: runtime_name.to_string(),
                };
                if let Err(e) = bus.publish(&subject, &msg).await {
                    tracing::warn!(error = %e, "failed to publish heartbeat");
                }
            }
        }
    }
}

/// Resource sampling is host-OS plumbing out of scope for this spec (§1,
/// "host resource sampling internals"); report a placeholder value rather
/// than link a `sysinfo`-style dependency with no grounding in the pack.
fn read_cpu_percent() -> f64 {
    0.0
}

fn read_mem_mb() -> u64 {
    0
}

fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
