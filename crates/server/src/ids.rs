// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed identifiers shared by the hook tables and the request protocol.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:04x}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Process identifier from the process registry
    ProcessId
);
numeric_id!(
    /// Thread identifier from the thread registry
    ThreadId
);
numeric_id!(
    /// Message queue identifier; each queue may own a hook table
    QueueId
);

/// Opaque user handle naming a hook while it is alive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserHandle(pub u32);

impl fmt::Display for UserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Client-side callback address of a hook.
///
/// Never interpreted by the server. Zero means "no callback", which is why the
/// token itself is non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackToken(NonZeroU64);

impl CallbackToken {
    /// Wrap a raw token, rejecting the empty (zero) value
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Raw token value as sent back to the client
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Event target parameters carried through to the hook callback
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetParams {
    pub window: u32,
    pub object_id: i32,
    pub child_id: i32,
}
