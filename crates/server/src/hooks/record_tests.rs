// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use crate::ids::QueueId;
use yare::parameterized;

const P1: ProcessId = ProcessId(1);
const P2: ProcessId = ProcessId(2);
const T10: ThreadId = ThreadId(10);
const T11: ThreadId = ThreadId(11);
const T20: ThreadId = ThreadId(20);

fn current(tid: ThreadId, pid: ProcessId) -> ThreadInfo {
    ThreadInfo {
        tid,
        pid,
        process_serial: u64::from(pid.0),
        queue: QueueId(tid.0),
    }
}

fn record(
    kind: HookKind,
    scope_process: Option<ProcessId>,
    scope_thread: Option<(ThreadId, ProcessId)>,
    flags: HookFlags,
) -> HookRecord {
    HookRecord {
        handle: UserHandle(0x0001_0020),
        table: TableId::Global,
        kind,
        scope_process: scope_process.map(|pid| ProcessRef {
            pid,
            serial: u64::from(pid.0),
        }),
        scope_thread: scope_thread.map(|(tid, pid)| ThreadRef { tid, pid }),
        owner: T10,
        event_min: 10,
        event_max: 20,
        flags,
        callback: CallbackToken::new(0x1000),
        unicode: false,
        module: None,
    }
}

#[parameterized(
    below = { 9, false },
    min = { 10, true },
    middle = { 15, true },
    max = { 20, true },
    above = { 21, false },
)]
fn event_range_is_inclusive(event: i32, accepted: bool) {
    let hook = record(HookKind::Cbt, None, None, HookFlags::default());
    assert_eq!(hook.accepts_event(event), accepted);
}

#[parameterized(
    unscoped = { None, None, HookFlags::default(), T10, P1, true },
    process_match = { Some(P1), None, HookFlags::default(), T10, P1, true },
    process_mismatch = { Some(P1), None, HookFlags::default(), T20, P2, false },
    thread_match = { None, Some((T10, P1)), HookFlags::default(), T10, P1, true },
    thread_mismatch = { None, Some((T10, P1)), HookFlags::default(), T11, P1, false },
    skip_own_process = { Some(P1), None, HookFlags::SKIP_OWN_PROCESS, T10, P1, false },
    skip_own_process_unscoped = { None, None, HookFlags::SKIP_OWN_PROCESS, T10, P1, true },
    skip_own_thread = { None, Some((T10, P1)), HookFlags::SKIP_OWN_THREAD, T10, P1, false },
    skip_own_thread_other_process_scope = { Some(P1), None, HookFlags::SKIP_OWN_THREAD, T11, P1, true },
)]
fn affinity_filter(
    scope_process: Option<ProcessId>,
    scope_thread: Option<(ThreadId, ProcessId)>,
    flags: HookFlags,
    tid: ThreadId,
    pid: ProcessId,
    runs: bool,
) {
    let hook = record(HookKind::WinEvent, scope_process, scope_thread, flags);
    assert_eq!(hook.runs_for(&current(tid, pid)), runs);
}

#[parameterized(
    cbt_without_flag = { HookKind::Cbt, HookFlags::OUT_OF_CONTEXT, true },
    cbt_with_flag = { HookKind::Cbt, HookFlags::IN_CONTEXT, true },
    keyboard_ll = { HookKind::KeyboardLl, HookFlags::OUT_OF_CONTEXT, true },
    win_event_out_of_context = { HookKind::WinEvent, HookFlags::OUT_OF_CONTEXT, false },
    win_event_in_context = { HookKind::WinEvent, HookFlags::IN_CONTEXT, true },
)]
fn only_win_events_go_out_of_context(kind: HookKind, flags: HookFlags, in_context: bool) {
    assert_eq!(record(kind, None, None, flags).is_in_context(), in_context);
}

#[test]
fn tombstoned_record_is_not_live() {
    let mut hook = record(HookKind::Cbt, None, None, HookFlags::default());
    assert!(hook.is_live());
    hook.callback = None;
    assert!(!hook.is_live());
}

#[test]
fn foreign_thread_only_for_other_threads() {
    let hook = record(HookKind::Cbt, None, Some((T20, P2)), HookFlags::default());
    assert_eq!(
        hook.foreign_thread(&current(T10, P1)),
        Some(ThreadRef { tid: T20, pid: P2 })
    );
    assert_eq!(hook.foreign_thread(&current(T20, P2)), None);

    let global = record(HookKind::Cbt, None, None, HookFlags::default());
    assert_eq!(global.foreign_thread(&current(T10, P1)), None);
}

#[test]
fn process_scope_does_not_match_a_reused_pid() {
    let hook = record(HookKind::Cbt, Some(P2), None, HookFlags::default());
    let reused = ThreadInfo {
        process_serial: 7,
        ..current(T20, P2)
    };

    assert!(hook.runs_for(&current(T20, P2)));
    assert!(!hook.runs_for(&reused));
}
