// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hook tables and the chain-walk protocol.
//!
//! Hooks are registered into either the session-wide global table or the
//! table of one message queue. A producer of an event walks the matching
//! chains in a begin / advance / finish sequence of requests; hooks removed
//! during a walk are only marked deleted until the walk finishes.

pub mod kind;
pub mod record;
pub mod registry;
pub mod table;
pub mod walker;

pub use kind::{ActiveHooks, HookFlags, HookKind, HOOK_KINDS};
pub use record::{HookRecord, RecordKey, ThreadRef};
pub use registry::{ChainSnapshot, HookRegistry, Registration, TableSnapshot};
pub use table::{HookTable, TableId};
pub use walker::{ChainEvent, ChainHook};

#[cfg(test)]
pub(crate) mod test_helpers;
