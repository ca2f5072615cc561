// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! A single registered hook.

use super::kind::{HookFlags, HookKind};
use super::table::TableId;
use crate::ids::{CallbackToken, ProcessId, ThreadId, UserHandle};
use crate::threads::{ProcessRef, ThreadInfo};
use serde::Serialize;

/// Stable arena key of a hook record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordKey(pub u64);

/// A thread together with the process it belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ThreadRef {
    pub tid: ThreadId,
    pub pid: ProcessId,
}

impl From<&ThreadInfo> for ThreadRef {
    fn from(info: &ThreadInfo) -> Self {
        Self {
            tid: info.tid,
            pid: info.pid,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HookRecord {
    pub handle: UserHandle,
    /// Table holding this record; fixed at registration
    pub table: TableId,
    pub kind: HookKind,
    /// Only events produced by this process run the hook; a later process
    /// reusing the id does not match
    pub scope_process: Option<ProcessRef>,
    /// Only events produced by this thread run the hook
    pub scope_thread: Option<ThreadRef>,
    /// Thread that registered the hook
    pub owner: ThreadId,
    pub event_min: i32,
    pub event_max: i32,
    pub flags: HookFlags,
    /// `None` once the hook was removed while its chain was in use
    pub callback: Option<CallbackToken>,
    pub unicode: bool,
    pub module: Option<Vec<u8>>,
}

impl HookRecord {
    pub fn is_live(&self) -> bool {
        self.callback.is_some()
    }

    pub fn accepts_event(&self, event: i32) -> bool {
        (self.event_min..=self.event_max).contains(&event)
    }

    /// Whether the hook runs for an event produced by `current`
    pub fn runs_for(&self, current: &ThreadInfo) -> bool {
        let process = self.scope_process;
        let producer = current.process();
        let thread = self.scope_thread.map(|t| t.tid);

        process.map_or(true, |p| p == producer)
            && (!self.flags.contains(HookFlags::SKIP_OWN_PROCESS) || process != Some(producer))
            && thread.map_or(true, |t| t == current.tid)
            && (!self.flags.contains(HookFlags::SKIP_OWN_THREAD) || thread != Some(current.tid))
    }

    /// Whether the requester runs the callback through the chain protocol.
    ///
    /// Only win-event hooks may be delivered out of context.
    pub fn is_in_context(&self) -> bool {
        self.kind != HookKind::WinEvent || self.flags.contains(HookFlags::IN_CONTEXT)
    }

    /// Thread that must run the callback when it is not `current`
    pub fn foreign_thread(&self, current: &ThreadInfo) -> Option<ThreadRef> {
        self.scope_thread.filter(|t| t.tid != current.tid)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
