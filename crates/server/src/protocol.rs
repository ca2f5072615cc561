// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Decoded requests and replies of the hook operations.

use crate::hooks::{ActiveHooks, ChainHook, HookFlags, HookKind, ThreadRef};
use crate::ids::{ProcessId, TargetParams, ThreadId, UserHandle};
use serde::{Deserialize, Serialize};

/// Register a hook
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetHook {
    /// Wire id of the hook category
    pub id: i32,
    #[serde(default)]
    pub pid: Option<ProcessId>,
    #[serde(default)]
    pub tid: Option<ThreadId>,
    #[serde(default)]
    pub event_min: i32,
    #[serde(default)]
    pub event_max: i32,
    #[serde(default)]
    pub flags: HookFlags,
    pub callback: u64,
    #[serde(default)]
    pub unicode: bool,
    /// Module path of the callback
    #[serde(default, with = "blob_serde")]
    pub module: Vec<u8>,
}

/// Remove a hook, by handle or by its callback
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveHook {
    /// Removes by handle when set; `id` and `callback` are ignored then
    #[serde(default)]
    pub handle: Option<UserHandle>,
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub callback: u64,
}

/// Begin a chain walk for an event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartHookChain {
    pub id: i32,
    pub event: i32,
    #[serde(default)]
    pub target: TargetParams,
}

/// Continue a chain walk after the hook named by `handle`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetNextHook {
    pub handle: UserHandle,
    pub event: i32,
    #[serde(default)]
    pub target: TargetParams,
}

/// End a chain walk
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinishHookChain {
    pub id: i32,
}

/// A request, already decoded from the transport
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    SetHook(SetHook),
    RemoveHook(RemoveHook),
    StartHookChain(StartHookChain),
    GetNextHook(GetNextHook),
    FinishHookChain(FinishHookChain),
}

impl Request {
    /// Operation name as it appears on the wire
    pub fn op(&self) -> &'static str {
        match self {
            Request::SetHook(_) => "set_hook",
            Request::RemoveHook(_) => "remove_hook",
            Request::StartHookChain(_) => "start_hook_chain",
            Request::GetNextHook(_) => "get_next_hook",
            Request::FinishHookChain(_) => "finish_hook_chain",
        }
    }
}

/// Where the callback of a returned hook must run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryContext {
    /// The requester runs it
    Current,
    /// A thread other than the requester runs it
    Thread { pid: ProcessId, tid: ThreadId },
}

impl From<Option<ThreadRef>> for DeliveryContext {
    fn from(thread: Option<ThreadRef>) -> Self {
        match thread {
            Some(t) => DeliveryContext::Thread {
                pid: t.pid,
                tid: t.tid,
            },
            None => DeliveryContext::Current,
        }
    }
}

/// A hook the requester must call
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HookReply {
    pub handle: UserHandle,
    pub kind: HookKind,
    pub callback: u64,
    pub unicode: bool,
    pub runs_on: DeliveryContext,
    #[serde(
        with = "blob_serde::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub module: Option<Vec<u8>>,
}

impl From<ChainHook> for HookReply {
    fn from(hook: ChainHook) -> Self {
        Self {
            handle: hook.handle,
            kind: hook.kind,
            callback: hook.callback.get(),
            unicode: hook.unicode,
            runs_on: hook.runs_on.into(),
            module: hook.module,
        }
    }
}

/// Reply to a successful request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    SetHook {
        handle: UserHandle,
        active_hooks: ActiveHooks,
    },
    RemoveHook {
        active_hooks: ActiveHooks,
    },
    StartHookChain {
        active_hooks: ActiveHooks,
        hook: Option<HookReply>,
    },
    GetNextHook {
        /// Unicode flag of the hook advanced from
        prev_unicode: bool,
        hook: Option<HookReply>,
    },
    FinishHookChain,
}

/// Module blobs travel as text; bytes that are not UTF-8 are replaced.
mod blob_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(blob: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&String::from_utf8_lossy(blob))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(String::deserialize(deserializer)?.into_bytes())
    }

    pub mod option {
        use serde::Serializer;

        pub fn serialize<S>(blob: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match blob {
                Some(blob) => super::serialize(blob, serializer),
                None => serializer.serialize_none(),
            }
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
