// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hook categories and registration flags.

use crate::error::HookError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of hook categories, and so of chains in every hook table
pub const HOOK_KINDS: usize = 17;

/// Interception category. Each category has its own chain in a hook table.
///
/// Discriminants are the wire ids clients send; the chain index is the id
/// shifted so the lowest category lands on zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    MsgFilter = -1,
    JournalRecord = 0,
    JournalPlayback = 1,
    Keyboard = 2,
    GetMessage = 3,
    CallWndProc = 4,
    Cbt = 5,
    SysMsgFilter = 6,
    Mouse = 7,
    Hardware = 8,
    Debug = 9,
    Shell = 10,
    ForegroundIdle = 11,
    CallWndProcRet = 12,
    /// Low-level keyboard: always global, owned by the registering thread
    KeyboardLl = 13,
    /// Low-level mouse: always global, owned by the registering thread
    MouseLl = 14,
    /// Accessibility events; the only category with out-of-context delivery
    WinEvent = 15,
}

impl HookKind {
    /// Lowest wire id
    pub const MIN_ID: i32 = -1;
    /// Highest wire id
    pub const MAX_ID: i32 = 15;

    /// Every category in chain order
    pub const ALL: [HookKind; HOOK_KINDS] = [
        HookKind::MsgFilter,
        HookKind::JournalRecord,
        HookKind::JournalPlayback,
        HookKind::Keyboard,
        HookKind::GetMessage,
        HookKind::CallWndProc,
        HookKind::Cbt,
        HookKind::SysMsgFilter,
        HookKind::Mouse,
        HookKind::Hardware,
        HookKind::Debug,
        HookKind::Shell,
        HookKind::ForegroundIdle,
        HookKind::CallWndProcRet,
        HookKind::KeyboardLl,
        HookKind::MouseLl,
        HookKind::WinEvent,
    ];

    /// The categories that live in the global table regardless of scoping
    pub const LOW_LEVEL: [HookKind; 2] = [HookKind::KeyboardLl, HookKind::MouseLl];

    /// Resolve a wire id
    pub fn from_id(id: i32) -> Result<Self, HookError> {
        if !(Self::MIN_ID..=Self::MAX_ID).contains(&id) {
            return Err(HookError::invalid_parameter(format!(
                "hook id {} outside {}..={}",
                id,
                Self::MIN_ID,
                Self::MAX_ID
            )));
        }
        Ok(Self::ALL[(id - Self::MIN_ID) as usize])
    }

    /// Wire id of this category
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Chain index of this category
    pub fn index(self) -> usize {
        (self.id() - Self::MIN_ID) as usize
    }

    pub fn is_low_level(self) -> bool {
        matches!(self, HookKind::KeyboardLl | HookKind::MouseLl)
    }
}

impl TryFrom<i32> for HookKind {
    type Error = HookError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookKind::MsgFilter => "msg_filter",
            HookKind::JournalRecord => "journal_record",
            HookKind::JournalPlayback => "journal_playback",
            HookKind::Keyboard => "keyboard",
            HookKind::GetMessage => "get_message",
            HookKind::CallWndProc => "call_wnd_proc",
            HookKind::Cbt => "cbt",
            HookKind::SysMsgFilter => "sys_msg_filter",
            HookKind::Mouse => "mouse",
            HookKind::Hardware => "hardware",
            HookKind::Debug => "debug",
            HookKind::Shell => "shell",
            HookKind::ForegroundIdle => "foreground_idle",
            HookKind::CallWndProcRet => "call_wnd_proc_ret",
            HookKind::KeyboardLl => "keyboard_ll",
            HookKind::MouseLl => "mouse_ll",
            HookKind::WinEvent => "win_event",
        };
        f.write_str(name)
    }
}

/// Registration flags of a hook
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookFlags(pub u32);

impl HookFlags {
    /// Out-of-context delivery (no other bits)
    pub const OUT_OF_CONTEXT: HookFlags = HookFlags(0x0);
    /// Do not run for events produced by the scoping thread
    pub const SKIP_OWN_THREAD: HookFlags = HookFlags(0x1);
    /// Do not run for events produced by the scoping process
    pub const SKIP_OWN_PROCESS: HookFlags = HookFlags(0x2);
    /// The requester runs the callback itself through the chain protocol
    pub const IN_CONTEXT: HookFlags = HookFlags(0x4);

    pub fn contains(self, other: HookFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for HookFlags {
    type Output = HookFlags;

    fn bitor(self, rhs: HookFlags) -> HookFlags {
        HookFlags(self.0 | rhs.0)
    }
}

/// Bitmap of categories that currently have a hook for a given thread.
///
/// Bit 31 is always set on masks the server produces so clients can tell a
/// computed mask from an absent one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveHooks(pub u32);

impl ActiveHooks {
    /// Validity sentinel bit
    pub const VALID: u32 = 1 << 31;

    /// A valid mask with no category set
    pub fn empty() -> Self {
        ActiveHooks(Self::VALID)
    }

    pub fn insert(&mut self, kind: HookKind) {
        self.0 |= 1 << kind.index();
    }

    pub fn contains(self, kind: HookKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }

    pub fn is_valid(self) -> bool {
        self.0 & Self::VALID != 0
    }

    /// Categories set in this mask, in chain order
    pub fn kinds(self) -> impl Iterator<Item = HookKind> {
        HookKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

#[cfg(test)]
#[path = "kind_tests.rs"]
mod tests;
