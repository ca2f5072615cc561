// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Out-of-context event delivery.

use crate::ids::{CallbackToken, TargetParams, ThreadId, UserHandle};
use hookchain_capture::{CapturedDelivery, DeliveryLog};
use tracing::warn;

/// Event handed straight to a hook's registrar instead of the requester
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutOfContextEvent {
    /// Registrar of the hook; the callback runs as this thread
    pub destination: ThreadId,
    pub event: i32,
    pub target: TargetParams,
    pub callback: CallbackToken,
    pub module: Option<Vec<u8>>,
    pub handle: UserHandle,
}

/// Fire-and-forget delivery of out-of-context events.
///
/// Posting never blocks the current request and is never acknowledged. A
/// sink that can fail keeps its own record of failures for its owner.
pub trait EventSink {
    fn post_event(&mut self, event: OutOfContextEvent);
}

impl EventSink for DeliveryLog {
    fn post_event(&mut self, event: OutOfContextEvent) {
        let destination = event.destination;
        let handle = event.handle;
        let recorded = self.record(CapturedDelivery {
            destination: event.destination.0,
            event: event.event,
            window: event.target.window,
            object_id: event.target.object_id,
            child_id: event.target.child_id,
            callback: event.callback.get(),
            module: event
                .module
                .map(|m| String::from_utf8_lossy(&m).into_owned()),
            handle: event.handle.0,
        });
        if let Err(e) = recorded {
            warn!(%destination, %handle, error = %e, "delivery not written to log file");
        }
    }
}

impl EventSink for Vec<OutOfContextEvent> {
    fn post_event(&mut self, event: OutOfContextEvent) {
        self.push(event);
    }
}
