// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscribes to this host's deploy subject and drives every dispatched
//! [`DiffOp`] through the [`LifecycleController`], publishing the resulting
//! status back to the Central Orchestrator-facing status subject (§4.9,
//! §6). Grounded on `internal/edgenode/edgenode.go`'s subscribe-apply-report
//! loop; the bus handler itself stays synchronous and spawns the actual
//! apply so a slow lifecycle action never blocks delivery of the next op
//! (§5, "Don't block bus callbacks").
use std::sync::Arc;

use eoc_bus::{deploy_subject, status_subject, MessageBus, Subscription};
use eoc_core::{DiffOp, HostId, SiteId};
use eoc_engine::LifecycleController;

use crate::error::EraError;

pub async fn run<B: MessageBus + 'static>(
    bus: Arc<B>,
    site_id: SiteId,
    host_id: HostId,
    controller: Arc<LifecycleController>,
) -> Result<Box<dyn Subscription>, EraError> {
    let subject = deploy_subject(&site_id.to_string(), &host_id.to_string());
    let status_subject = status_subject(&site_id.to_string(), &host_id.to_string());

    let publish_bus = bus.clone();
    let sub = bus
        .subscribe::<DiffOp, _>(&subject, move |op| {
            let bus = publish_bus.clone();
            let controller = controller.clone();
            let status_subject = status_subject.clone();
            tokio::spawn(async move {
                let status = controller.apply(&op).await;
                if let Err(e) = bus.publish(&status_subject, &status).await {
                    tracing::error!(error = %e, deployment_id = %status.deployment_id, "failed to publish status report");
                }
            });
        })
        .await?;

    tracing::info!(subject = %subject, "ERA deploy dispatcher subscribed");
    Ok(sub)
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
