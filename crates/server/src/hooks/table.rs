// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hook tables: one ordered chain and one use count per category.

use super::kind::{HookKind, HOOK_KINDS};
use super::record::RecordKey;
use crate::error::HookError;
use crate::ids::QueueId;
use serde::Serialize;
use std::fmt;

/// Which table a hook lives in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "table", content = "queue", rename_all = "snake_case")]
pub enum TableId {
    /// The session-wide table
    Global,
    /// The table of one message queue
    Queue(QueueId),
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableId::Global => f.write_str("global hook table"),
            TableId::Queue(queue) => write!(f, "hook table for queue {}", queue),
        }
    }
}

/// Chains of record keys, most recently registered first.
///
/// While a chain's use count is non-zero, chain walks are in progress and
/// removed records must stay linked; they are swept when the count drops
/// back to zero.
#[derive(Clone, Debug)]
pub struct HookTable {
    chains: [Vec<RecordKey>; HOOK_KINDS],
    counts: [u32; HOOK_KINDS],
}

impl HookTable {
    pub fn new() -> Self {
        Self {
            chains: std::array::from_fn(|_| Vec::new()),
            counts: [0; HOOK_KINDS],
        }
    }

    /// Link a record at the head of its chain
    pub fn push_front(&mut self, kind: HookKind, key: RecordKey) {
        self.chains[kind.index()].insert(0, key);
    }

    /// Keys of a chain in walk order
    pub fn chain(&self, kind: HookKind) -> &[RecordKey] {
        &self.chains[kind.index()]
    }

    pub fn position(&self, kind: HookKind, key: RecordKey) -> Option<usize> {
        self.chain(kind).iter().position(|k| *k == key)
    }

    /// Unlink a record; returns whether it was linked
    pub fn unlink(&mut self, kind: HookKind, key: RecordKey) -> bool {
        match self.position(kind, key) {
            Some(pos) => {
                self.chains[kind.index()].remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn use_count(&self, kind: HookKind) -> u32 {
        self.counts[kind.index()]
    }

    pub fn in_use(&self, kind: HookKind) -> bool {
        self.use_count(kind) > 0
    }

    /// Note one more walk in progress over a chain
    pub fn acquire(&mut self, kind: HookKind) {
        self.counts[kind.index()] += 1;
    }

    /// Note the end of a walk; returns the remaining use count
    pub fn release(&mut self, kind: HookKind) -> Result<u32, HookError> {
        let count = &mut self.counts[kind.index()];
        if *count == 0 {
            return Err(HookError::invalid_parameter(format!(
                "{} chain is not in use",
                kind
            )));
        }
        *count -= 1;
        Ok(*count)
    }

    pub fn is_empty(&self) -> bool {
        self.chains.iter().all(Vec::is_empty)
    }

    /// Consume the table, yielding every linked key
    pub fn into_keys(self) -> impl Iterator<Item = RecordKey> {
        self.chains.into_iter().flatten()
    }
}

impl Default for HookTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
