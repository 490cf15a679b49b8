// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical-JSON content hashing used for convergence detection.
//!
//! `ActualApp.hash == canonical_hash(desired App)` short-circuits the diff
//! engine to a no-op for that host (§4.6). Canonical form: sorted object
//! keys, no whitespace — `serde_json::Value`'s `BTreeMap`-backed map already
//! sorts keys, so round-tripping through `Value` before serializing gives
//! us the canonical form without hand-rolling a serializer.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hash any serializable value as canonical JSON (sorted keys, no whitespace).
///
/// Returns the lowercase hex-encoded SHA-256 digest.
pub fn canonical_hash<T: Serialize>(value: &T) -> String {
    let bytes = canonical_json_bytes(value);
    format!("{:x}", Sha256::digest(&bytes))
}

fn canonical_json_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    // serde_json::Value's Map is a BTreeMap by default, so serializing
    // through Value normalizes key order even if the source struct's field
    // order (or a HashMap field) would not otherwise be stable.
    let value: serde_json::Value =
        serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
    serde_json::to_vec(&value).unwrap_or_default()
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod tests;
