// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! eoc-store: durable nested-bucket JSON state store (§4.1).
//!
//! Bucket paths map onto flat, sorted `sled::Tree`s with composite keys
//! (`"<segment>/<segment>"`), which gives prefix-scan iteration
//! (`LoadAll`) for free while keeping the literal bucket-path vocabulary
//! (`hosts/<host_id>`, `desired/<deployment_id>/app`,
//! `actual/<host_id>/<app_id>`, `operations/<deployment_id>-<ns_ts>`) from
//! the original design intact. All writes are serialized through one
//! writer task consuming a bounded queue (§4.1, "Concurrency discipline");
//! reads go straight to `sled`, which gives a lock-free MVCC view.

mod error;
mod store;
mod writer;

pub use error::StoreError;
pub use store::StateStore;
