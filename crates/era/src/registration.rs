// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup registration handshake against the LO's admission API (§6,
//! `POST /register`). A host registers once at process start so the LO's
//! heartbeat monitor has an entry for it even before its first periodic
//! heartbeat lands on the bus, and — per §11 — this is how an ERA instance
//! learns its own `site_id`: the LO's response body is the site id string
//! (§6, `POST /register` → site_id), not just an acknowledgement.

use eoc_core::{HostId, SiteId};

use crate::error::EraError;

/// Register `host_id` with the LO at `lo_url` and return the site id it
/// responds with (§6, §11). A non-success status or an unparseable body is
/// reported as an error — the caller decides whether to fall back to a
/// locally known site id or treat it as fatal.
pub async fn register(client: &reqwest::Client, lo_url: &str, host_id: HostId) -> Result<SiteId, EraError> {
    let resp = client
        .post(format!("{lo_url}/register"))
        .json(&serde_json::json!({ "host_id": host_id.to_string() }))
        .send()
        .await?;
    if !resp.status().is_success() {
        return Err(EraError::Registration(format!("LO responded with {}", resp.status())));
    }
    let site_id: String = resp
        .json()
        .await
        .map_err(|e| EraError::Registration(format!("failed to decode site id: {e}")))?;
    Ok(SiteId::from_string(site_id))
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod tests;
