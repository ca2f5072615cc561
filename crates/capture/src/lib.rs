// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recording of out-of-context hook event deliveries.
//!
//! The hook server hands events for out-of-context hooks to a delivery sink
//! instead of returning them through the chain protocol. This crate provides
//! a sink that records every delivery so tests and the replay tool can
//! inspect what was posted, and to whom.

mod delivery;
mod elapsed_micros;
mod log;

pub use delivery::{CapturedDelivery, PostedDelivery};
pub use log::DeliveryLog;
