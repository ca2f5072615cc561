// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Captured delivery data types.

use super::elapsed_micros;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// One out-of-context event as handed to the owning thread
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedDelivery {
    /// Thread the event is posted to (the hook's registrar)
    pub destination: u32,
    /// Event number
    pub event: i32,
    /// Target window of the event
    pub window: u32,
    pub object_id: i32,
    pub child_id: i32,
    /// Callback token of the hook being notified
    pub callback: u64,
    /// Module the callback lives in, if the hook carries one
    pub module: Option<String>,
    /// Handle of the hook being notified
    pub handle: u32,
}

/// Recorded delivery with ordering metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostedDelivery {
    /// Sequence number
    pub seq: u64,

    /// Wall-clock timestamp
    pub timestamp: SystemTime,

    /// Elapsed time since the log was created
    #[serde(rename = "elapsed_us", with = "elapsed_micros")]
    pub elapsed: Duration,

    #[serde(flatten)]
    pub delivery: CapturedDelivery,
}
