// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! eoc-bus: subject-addressed pub/sub (§4.2), backed by NATS.
//!
//! Delivery is at-least-once; every handler registered through
//! [`MessageBus::subscribe`] must tolerate duplicates (§5, "At-least-once").

mod error;
mod mock;
mod nats;
mod subjects;
mod traits;

pub use error::BusError;
pub use mock::MockBus;
pub use nats::NatsBus;
pub use subjects::{deploy_subject, health_subject, status_subject, status_wildcard};
pub use traits::{MessageBus, Subscription};
