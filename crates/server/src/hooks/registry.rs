// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hook registry: the record arena, the global table, and per-queue tables.

use super::kind::{ActiveHooks, HookFlags, HookKind};
use super::record::{HookRecord, RecordKey, ThreadRef};
use super::table::{HookTable, TableId};
use crate::error::HookError;
use crate::handles::{HandleTable, UserHandleTable};
use crate::ids::{CallbackToken, QueueId, ThreadId, UserHandle};
use crate::threads::{ProcessRef, ThreadInfo};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// A validated hook registration with its ids already resolved
#[derive(Clone, Debug)]
pub struct Registration {
    pub kind: HookKind,
    pub event_min: i32,
    pub event_max: i32,
    pub flags: HookFlags,
    pub callback: CallbackToken,
    pub unicode: bool,
    /// Process the hook is restricted to
    pub process: Option<ProcessRef>,
    /// Thread the hook is set on; `None` for a session-wide hook
    pub thread: Option<ThreadInfo>,
    /// Module holding the callback, empty when not supplied
    pub module: Vec<u8>,
}

/// Owner of every hook record and table.
///
/// Records live in an arena keyed by [`RecordKey`]; tables hold only keys.
/// The global table exists from the first session-wide registration until
/// [`HookRegistry::close_global`]; a queue table exists from the first hook
/// set on that queue until [`HookRegistry::destroy_queue_table`].
pub struct HookRegistry {
    records: HashMap<RecordKey, HookRecord>,
    next_key: u64,
    pub(super) global: Option<HookTable>,
    pub(super) queues: BTreeMap<QueueId, HookTable>,
    handles: Box<dyn HandleTable>,
}

impl HookRegistry {
    /// Create a registry with a default-sized handle table
    pub fn new() -> Self {
        Self::with_handles(Box::new(UserHandleTable::default()))
    }

    /// Create a registry allocating handles from `handles`
    pub fn with_handles(handles: Box<dyn HandleTable>) -> Self {
        Self {
            records: HashMap::new(),
            next_key: 1,
            global: None,
            queues: BTreeMap::new(),
            handles,
        }
    }

    pub fn table(&self, id: TableId) -> Option<&HookTable> {
        match id {
            TableId::Global => self.global.as_ref(),
            TableId::Queue(queue) => self.queues.get(&queue),
        }
    }

    pub(super) fn table_mut(&mut self, id: TableId) -> Option<&mut HookTable> {
        match id {
            TableId::Global => self.global.as_mut(),
            TableId::Queue(queue) => self.queues.get_mut(&queue),
        }
    }

    pub(super) fn table_or_create(&mut self, id: TableId) -> &mut HookTable {
        match id {
            TableId::Global => self.global.get_or_insert_with(HookTable::new),
            TableId::Queue(queue) => self.queues.entry(queue).or_default(),
        }
    }

    pub fn record(&self, key: RecordKey) -> Option<&HookRecord> {
        self.records.get(&key)
    }

    /// Resolve a handle to a record that has not been freed yet
    pub fn resolve(&self, handle: UserHandle) -> Option<RecordKey> {
        self.handles
            .get(handle)
            .filter(|key| self.records.contains_key(key))
    }

    /// Number of records not yet freed, soft-deleted ones included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Create a hook and link it at the head of its chain.
    ///
    /// Low-level hooks always go to the global table, bound to the
    /// registering thread. Other hooks go to the target thread's queue table,
    /// or to the global table when no thread is given.
    pub fn add_hook(
        &mut self,
        current: &ThreadInfo,
        reg: Registration,
    ) -> Result<UserHandle, HookError> {
        let (table, scope_thread, module) = if reg.kind.is_low_level() {
            (TableId::Global, Some(ThreadRef::from(current)), None)
        } else if let Some(thread) = reg.thread {
            (TableId::Queue(thread.queue), Some(ThreadRef::from(&thread)), None)
        } else {
            if reg.module.is_empty() && reg.flags.contains(HookFlags::IN_CONTEXT) {
                return Err(HookError::invalid_parameter(
                    "global in-context hook requires a module",
                ));
            }
            let module = (!reg.module.is_empty()).then_some(reg.module);
            (TableId::Global, None, module)
        };

        let key = RecordKey(self.next_key);
        let handle = self.handles.alloc(key).ok_or(HookError::HandleTableFull)?;
        self.next_key += 1;

        debug!(
            %handle,
            kind = %reg.kind,
            %table,
            owner = %current.tid,
            event_min = reg.event_min,
            event_max = reg.event_max,
            flags = reg.flags.0,
            "hook registered"
        );

        self.table_or_create(table).push_front(reg.kind, key);
        self.records.insert(
            key,
            HookRecord {
                handle,
                table,
                kind: reg.kind,
                scope_process: reg.process,
                scope_thread,
                owner: current.tid,
                event_min: reg.event_min,
                event_max: reg.event_max,
                flags: reg.flags,
                callback: Some(reg.callback),
                unicode: reg.unicode,
                module,
            },
        );
        Ok(handle)
    }

    /// Find a live hook of the current thread by its callback
    pub fn find_hook(
        &self,
        current: &ThreadInfo,
        kind: HookKind,
        callback: CallbackToken,
    ) -> Option<RecordKey> {
        let (table, owned_by) = if kind.is_low_level() {
            (TableId::Global, Some(current.tid))
        } else {
            (TableId::Queue(current.queue), None)
        };
        self.table(table)?.chain(kind).iter().copied().find(|key| {
            self.records.get(key).is_some_and(|r| {
                r.callback == Some(callback) && owned_by.map_or(true, |tid| r.owner == tid)
            })
        })
    }

    /// Remove a hook by handle
    pub fn remove_by_handle(&mut self, handle: UserHandle) -> Result<(), HookError> {
        let key = self
            .resolve(handle)
            .ok_or(HookError::InvalidHandle(handle))?;
        self.remove_hook(key);
        Ok(())
    }

    /// Remove a hook of the current thread by its callback
    pub fn remove_by_callback(
        &mut self,
        current: &ThreadInfo,
        kind: HookKind,
        callback: CallbackToken,
    ) -> Result<(), HookError> {
        let key = self.find_hook(current, kind, callback).ok_or_else(|| {
            HookError::invalid_parameter(format!("no {} hook with callback {}", kind, callback))
        })?;
        self.remove_hook(key);
        Ok(())
    }

    /// Remove a hook, only marking it deleted while its chain is in use
    pub(super) fn remove_hook(&mut self, key: RecordKey) {
        let Some((table, kind)) = self.records.get(&key).map(|r| (r.table, r.kind)) else {
            return;
        };
        let in_use = self.table(table).is_some_and(|t| t.in_use(kind));
        if in_use {
            if let Some(record) = self.records.get_mut(&key) {
                debug!(handle = %record.handle, %kind, %table, "hook chain in use, deferring free");
                record.callback = None;
            }
        } else {
            self.free_record(key);
        }
    }

    /// Unlink a record and release everything it holds
    pub(super) fn free_record(&mut self, key: RecordKey) {
        let Some(record) = self.records.remove(&key) else {
            return;
        };
        debug!(handle = %record.handle, kind = %record.kind, table = %record.table, "hook freed");
        self.handles.free(record.handle);
        if let Some(table) = self.table_mut(record.table) {
            table.unlink(record.kind, key);
        }
    }

    /// Free every soft-deleted record of a chain
    pub(super) fn sweep(&mut self, table: TableId, kind: HookKind) {
        let dead: Vec<RecordKey> = match self.table(table) {
            Some(t) => t
                .chain(kind)
                .iter()
                .copied()
                .filter(|key| self.records.get(key).is_some_and(|r| !r.is_live()))
                .collect(),
            None => return,
        };
        for key in dead {
            self.free_record(key);
        }
    }

    fn chain_active(&self, table: TableId, kind: HookKind, current: &ThreadInfo) -> bool {
        self.table(table).is_some_and(|t| {
            t.chain(kind).iter().any(|key| {
                self.records
                    .get(key)
                    .is_some_and(|r| r.is_live() && r.runs_for(current))
            })
        })
    }

    /// Categories with at least one hook that would run for `current`.
    ///
    /// `current` stands in for the eventual event producer, so the mask is a
    /// hint for skipping the chain protocol, not a guarantee.
    pub fn active_hooks(&self, current: &ThreadInfo) -> ActiveHooks {
        let mut mask = ActiveHooks::empty();
        for kind in HookKind::ALL {
            if self.chain_active(TableId::Queue(current.queue), kind, current)
                || self.chain_active(TableId::Global, kind, current)
            {
                mask.insert(kind);
            }
        }
        mask
    }

    /// Remove the low-level hooks a thread registered
    pub fn purge_low_level(&mut self, thread: ThreadId) -> usize {
        let Some(global) = self.global.as_ref() else {
            return 0;
        };
        let owned: Vec<RecordKey> = HookKind::LOW_LEVEL
            .iter()
            .flat_map(|kind| global.chain(*kind).iter().copied())
            .filter(|key| {
                self.records
                    .get(key)
                    .is_some_and(|r| r.scope_thread.is_some_and(|t| t.tid == thread))
            })
            .collect();
        let count = owned.len();
        for key in owned {
            self.remove_hook(key);
        }
        if count > 0 {
            debug!(%thread, count, "low-level hooks removed with their thread");
        }
        count
    }

    fn drain(&mut self, table: HookTable) -> usize {
        let mut count = 0;
        for key in table.into_keys() {
            if let Some(record) = self.records.remove(&key) {
                self.handles.free(record.handle);
                count += 1;
            }
        }
        count
    }

    /// Destroy a queue's table with every hook in it, walks or not
    pub fn destroy_queue_table(&mut self, queue: QueueId) -> usize {
        let Some(table) = self.queues.remove(&queue) else {
            return 0;
        };
        let count = self.drain(table);
        info!(table = %TableId::Queue(queue), count, "hook table destroyed");
        count
    }

    /// Destroy the global table with every hook in it
    pub fn close_global(&mut self) -> usize {
        let Some(table) = self.global.take() else {
            return 0;
        };
        let count = self.drain(table);
        info!(table = %TableId::Global, count, "hook table destroyed");
        count
    }

    /// Describe every table, global first
    pub fn snapshot(&self) -> Vec<TableSnapshot> {
        let global = self.global.as_ref().map(|t| (TableId::Global, t));
        let queues = self.queues.iter().map(|(q, t)| (TableId::Queue(*q), t));
        global
            .into_iter()
            .chain(queues)
            .map(|(id, table)| TableSnapshot {
                table: id,
                chains: HookKind::ALL
                    .into_iter()
                    .filter(|kind| !table.chain(*kind).is_empty() || table.in_use(*kind))
                    .map(|kind| self.chain_snapshot(table, kind))
                    .collect(),
            })
            .collect()
    }

    fn chain_snapshot(&self, table: &HookTable, kind: HookKind) -> ChainSnapshot {
        let records: Vec<&HookRecord> = table
            .chain(kind)
            .iter()
            .filter_map(|key| self.records.get(key))
            .collect();
        ChainSnapshot {
            kind,
            use_count: table.use_count(kind),
            hooks: records.iter().map(|r| r.handle).collect(),
            deleted: records
                .iter()
                .filter(|r| !r.is_live())
                .map(|r| r.handle)
                .collect(),
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one table for diagnostics
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    #[serde(flatten)]
    pub table: TableId,
    pub chains: Vec<ChainSnapshot>,
}

/// State of one chain for diagnostics
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChainSnapshot {
    pub kind: HookKind,
    pub use_count: u32,
    /// Handles in walk order
    pub hooks: Vec<UserHandle>,
    /// Handles of removed hooks waiting for the chain to be released
    pub deleted: Vec<UserHandle>,
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
