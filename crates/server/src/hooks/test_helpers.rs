// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Shared fixtures for hook table tests.

use super::{ChainEvent, HookFlags, HookKind, Registration};
use crate::ids::{CallbackToken, ProcessId, QueueId, TargetParams, ThreadId};
use crate::threads::ThreadInfo;

/// Thread `tid` of process `pid`, owning queue `tid`; the process serial is `pid`
pub fn thread(tid: u32, pid: u32) -> ThreadInfo {
    ThreadInfo {
        tid: ThreadId(tid),
        pid: ProcessId(pid),
        process_serial: u64::from(pid),
        queue: QueueId(tid),
    }
}

pub fn token(raw: u64) -> CallbackToken {
    CallbackToken::new(raw).unwrap()
}

/// Session-wide registration accepting events 0..=100
pub fn global(kind: HookKind, callback: u64) -> Registration {
    Registration {
        kind,
        event_min: 0,
        event_max: 100,
        flags: HookFlags::default(),
        callback: token(callback),
        unicode: false,
        process: None,
        thread: None,
        module: Vec::new(),
    }
}

/// Registration on one thread's queue accepting events 0..=100
pub fn on_thread(kind: HookKind, callback: u64, target: &ThreadInfo) -> Registration {
    Registration {
        thread: Some(*target),
        ..global(kind, callback)
    }
}

pub fn event(current: &ThreadInfo, event: i32) -> ChainEvent<'_> {
    ChainEvent {
        current,
        event,
        target: TargetParams::default(),
    }
}
