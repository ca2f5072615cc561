// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Chain walks: start, advance, finish.
//!
//! A walk spans several independent requests, with the client running each
//! callback in between. The only state kept across those requests is the
//! use count of the walked chains and the handle of the hook last returned,
//! which the client hands back to advance.

use super::kind::HookKind;
use super::record::{RecordKey, ThreadRef};
use super::registry::HookRegistry;
use super::table::TableId;
use crate::dispatch::{EventSink, OutOfContextEvent};
use crate::error::HookError;
use crate::ids::{CallbackToken, TargetParams, UserHandle};
use crate::threads::ThreadInfo;
use tracing::{trace, warn};

/// Hook the requester must call next
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainHook {
    pub handle: UserHandle,
    pub kind: HookKind,
    pub callback: CallbackToken,
    pub unicode: bool,
    /// Thread that must run the callback when it is not the requester
    pub runs_on: Option<ThreadRef>,
    pub module: Option<Vec<u8>>,
}

/// Event being walked through a chain
#[derive(Clone, Copy, Debug)]
pub struct ChainEvent<'a> {
    pub current: &'a ThreadInfo,
    pub event: i32,
    pub target: TargetParams,
}

impl HookRegistry {
    /// First in-context hook at or after `from` in a chain.
    ///
    /// Out-of-context hooks met on the way are posted to their owner and
    /// skipped.
    fn scan(
        &self,
        table: TableId,
        kind: HookKind,
        from: usize,
        ev: &ChainEvent<'_>,
        sink: &mut dyn EventSink,
    ) -> Option<RecordKey> {
        let chain = self.table(table)?.chain(kind);
        for key in chain.iter().skip(from) {
            let Some(record) = self.record(*key) else {
                continue;
            };
            let Some(callback) = record.callback else {
                continue;
            };
            if !record.runs_for(ev.current) || !record.accepts_event(ev.event) {
                continue;
            }
            if record.is_in_context() {
                return Some(*key);
            }
            trace!(handle = %record.handle, owner = %record.owner, event = ev.event, "posting out-of-context event");
            sink.post_event(OutOfContextEvent {
                destination: record.owner,
                event: ev.event,
                target: ev.target,
                callback,
                module: record.module.clone(),
                handle: record.handle,
            });
        }
        None
    }

    fn chain_hook(&self, key: RecordKey, current: &ThreadInfo) -> Option<ChainHook> {
        let record = self.record(key)?;
        Some(ChainHook {
            handle: record.handle,
            kind: record.kind,
            callback: record.callback?,
            unicode: record.unicode,
            runs_on: record.foreign_thread(current),
            module: record.module.clone(),
        })
    }

    /// Find the first hook to call for an event, starting a walk.
    ///
    /// The requester's queue table is searched first, then the global table.
    /// When a hook is found the chain is pinned in both tables until
    /// [`HookRegistry::finish_chain`]. A table that does not exist yet is
    /// created empty so it is pinned too: hooks registered into it during
    /// the walk can still be reached by an advance.
    pub fn start_chain(
        &mut self,
        kind: HookKind,
        ev: &ChainEvent<'_>,
        sink: &mut dyn EventSink,
    ) -> Option<ChainHook> {
        let local = TableId::Queue(ev.current.queue);
        let key = self
            .scan(local, kind, 0, ev, sink)
            .or_else(|| self.scan(TableId::Global, kind, 0, ev, sink))?;

        for table in [local, TableId::Global] {
            self.table_or_create(table).acquire(kind);
        }

        let hook = self.chain_hook(key, ev.current)?;
        trace!(handle = %hook.handle, %kind, event = ev.event, "hook chain started");
        Some(hook)
    }

    /// Find the hook after `handle` in its walk.
    ///
    /// Returns the unicode flag of the hook being advanced from together
    /// with the next hook, if any. A walk falls back from a queue table to
    /// the global table once, never the other way.
    pub fn next_hook(
        &self,
        handle: UserHandle,
        ev: &ChainEvent<'_>,
        sink: &mut dyn EventSink,
    ) -> Result<(bool, Option<ChainHook>), HookError> {
        let key = self
            .resolve(handle)
            .ok_or(HookError::InvalidHandle(handle))?;
        let record = self.record(key).ok_or(HookError::InvalidHandle(handle))?;
        if record
            .scope_thread
            .is_some_and(|t| t.tid != ev.current.tid)
        {
            return Err(HookError::InvalidHandle(handle));
        }

        let (table, kind, prev_unicode) = (record.table, record.kind, record.unicode);
        let from = self
            .table(table)
            .and_then(|t| t.position(kind, key))
            .map_or(0, |pos| pos + 1);

        let mut next = self.scan(table, kind, from, ev, sink);
        if next.is_none() && table != TableId::Global {
            next = self.scan(TableId::Global, kind, 0, ev, sink);
        }

        let hook = next.and_then(|key| self.chain_hook(key, ev.current));
        if let Some(ref hook) = hook {
            trace!(from = %handle, to = %hook.handle, %kind, event = ev.event, "hook chain advanced");
        }
        Ok((prev_unicode, hook))
    }

    /// Release a chain in one table, sweeping removed hooks at zero
    fn release_chain(&mut self, table: TableId, kind: HookKind) -> Result<(), HookError> {
        let Some(t) = self.table_mut(table) else {
            return Ok(());
        };
        match t.release(kind) {
            Ok(0) => {
                self.sweep(table, kind);
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(%table, %kind, "hook chain released more often than started");
                Err(e)
            }
        }
    }

    /// End a walk: release the chain in the requester's table and the global
    /// table. Both are released even when one of them was not in use.
    pub fn finish_chain(&mut self, current: &ThreadInfo, kind: HookKind) -> Result<(), HookError> {
        let local = self.release_chain(TableId::Queue(current.queue), kind);
        let global = self.release_chain(TableId::Global, kind);
        local.and(global)
    }
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
