// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery log implementation.

use crate::delivery::{CapturedDelivery, PostedDelivery};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

#[derive(Default)]
struct LogState {
    deliveries: Vec<PostedDelivery>,
    file: Option<File>,
    write_failures: u64,
    /// First file error not yet taken by the owner
    pending_error: Option<io::Error>,
}

impl LogState {
    fn append_line(&mut self, posted: &PostedDelivery) -> io::Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        let mut line = serde_json::to_string(posted)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

/// Log of posted out-of-context deliveries.
///
/// Clones share the same underlying log, so a caller can keep one clone for
/// inspection while handing another to the server as its delivery sink.
/// Deliveries are always kept in memory; a file write that fails is reported
/// to the caller of [`DeliveryLog::record`] and remembered until
/// [`DeliveryLog::take_write_error`].
#[derive(Clone)]
pub struct DeliveryLog {
    start: Instant,
    state: Arc<Mutex<LogState>>,
}

impl DeliveryLog {
    /// Create a new in-memory delivery log
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            state: Arc::new(Mutex::new(LogState::default())),
        }
    }

    /// Create a delivery log that also appends JSON lines to a file.
    ///
    /// Existing content is kept; sequence numbers restart at zero.
    pub fn with_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let log = Self::new();
        log.state.lock().file = Some(file);
        Ok(log)
    }

    /// Record a delivery, returning its sequence number
    pub fn record(&self, delivery: CapturedDelivery) -> io::Result<u64> {
        let mut state = self.state.lock();
        let seq = state.deliveries.len() as u64;
        let posted = PostedDelivery {
            seq,
            timestamp: SystemTime::now(),
            elapsed: self.start.elapsed(),
            delivery,
        };

        let written = state.append_line(&posted);
        state.deliveries.push(posted);
        match written {
            Ok(()) => Ok(seq),
            Err(e) => {
                state.write_failures += 1;
                if state.pending_error.is_none() {
                    state.pending_error = Some(io::Error::new(e.kind(), e.to_string()));
                }
                Err(e)
            }
        }
    }

    /// Get all recorded deliveries
    pub fn deliveries(&self) -> Vec<PostedDelivery> {
        self.state.lock().deliveries.clone()
    }

    /// Find deliveries posted to a given thread
    pub fn for_destination(&self, thread: u32) -> Vec<PostedDelivery> {
        self.state
            .lock()
            .deliveries
            .iter()
            .filter(|d| d.delivery.destination == thread)
            .cloned()
            .collect()
    }

    /// The most recent `n` deliveries, oldest first
    pub fn last(&self, n: usize) -> Vec<PostedDelivery> {
        let state = self.state.lock();
        let skip = state.deliveries.len().saturating_sub(n);
        state.deliveries[skip..].to_vec()
    }

    pub fn count(&self, pred: impl Fn(&PostedDelivery) -> bool) -> usize {
        self.state.lock().deliveries.iter().filter(|d| pred(d)).count()
    }

    /// Forget recorded deliveries; the file and the failure count are kept
    pub fn clear(&self) {
        self.state.lock().deliveries.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().deliveries.is_empty()
    }

    /// Number of deliveries that could not be written to the file
    pub fn write_failures(&self) -> u64 {
        self.state.lock().write_failures
    }

    /// The first file write error since the last call, if any
    pub fn take_write_error(&self) -> Option<io::Error> {
        self.state.lock().pending_error.take()
    }
}

impl Default for DeliveryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
