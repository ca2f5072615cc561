// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use crate::hooks::HookKind;
use hookchain_capture::DeliveryLog;
use std::io::Write;
use yare::parameterized;

const SESSION: &str = r#"
name = "cbt walk"

[[processes]]
pid = 1
threads = [10, 11]

[[processes]]
pid = 2
threads = [20]
"#;

fn script(steps: &str) -> ReplayScript {
    ReplayScript::from_toml(&format!("{}\n{}", SESSION, steps)).unwrap()
}

fn replay(script: &ReplayScript) -> (Vec<StepOutcome>, DeliveryLog) {
    let log = DeliveryLog::new();
    let mut server = HookServer::new(Box::new(log.clone()));
    script.populate(&mut server).unwrap();
    (script.run(&mut server), log)
}

#[test]
fn parses_requests_and_lifecycle_steps() {
    let script = script(
        r#"
        [[steps]]
        thread = 10
        op = "set_hook"
        id = 5
        event_max = 100
        callback = 0xA

        [[steps]]
        thread = 11
        op = "start_hook_chain"
        id = 5
        event = 50
        target = { window = 4097 }

        [[steps]]
        thread = 11
        op = "thread_exit"

        [[steps]]
        op = "process_exit"
        pid = 2

        [[steps]]
        op = "shutdown"
        "#,
    );

    assert_eq!(script.name, "cbt walk");
    assert_eq!(script.processes.len(), 2);
    let ops: Vec<&str> = script.steps.iter().map(|s| s.action.op()).collect();
    assert_eq!(
        ops,
        vec![
            "set_hook",
            "start_hook_chain",
            "thread_exit",
            "process_exit",
            "shutdown"
        ]
    );
    match &script.steps[1].action {
        Action::StartHookChain(req) => assert_eq!(req.target.window, 4097),
        other => panic!("unexpected action {:?}", other),
    }
    assert_eq!(script.steps[3].thread, None);
}

#[test]
fn replays_walk_in_registration_order() {
    let script = script(
        r#"
        [[steps]]
        thread = 10
        op = "set_hook"
        id = 5
        event_max = 100
        callback = 0xA

        [[steps]]
        thread = 10
        op = "set_hook"
        id = 5
        event_max = 100
        callback = 0xB

        [[steps]]
        thread = 10
        op = "start_hook_chain"
        id = 5
        event = 50

        [[steps]]
        thread = 10
        op = "get_next_hook"
        handle = 0x10022
        event = 50

        [[steps]]
        thread = 10
        op = "finish_hook_chain"
        id = 5

        [[steps]]
        thread = 10
        op = "finish_hook_chain"
        id = 5
        "#,
    );

    let (outcomes, _) = replay(&script);

    assert_eq!(outcomes.len(), 6);
    assert!(outcomes[..5].iter().all(StepOutcome::is_success));
    match &outcomes[2].result {
        Outcome::Success {
            reply: Some(Reply::StartHookChain { hook: Some(hook), .. }),
        } => assert_eq!(hook.callback, 0xB),
        other => panic!("unexpected outcome {:?}", other),
    }
    match &outcomes[3].result {
        Outcome::Success {
            reply: Some(Reply::GetNextHook { hook: Some(hook), .. }),
        } => {
            assert_eq!(hook.callback, 0xA);
            assert_eq!(hook.kind, HookKind::Cbt);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(
        outcomes[5].result,
        Outcome::Error {
            error: "invalid_parameter",
            message: "Invalid parameter: cbt chain is not in use".to_string(),
        }
    );
}

#[test]
fn failed_steps_do_not_stop_replay() {
    let script = script(
        r#"
        [[steps]]
        thread = 10
        op = "remove_hook"
        handle = 0x10020

        [[steps]]
        thread = 20
        op = "thread_exit"

        [[steps]]
        thread = 20
        op = "set_hook"
        id = 5
        callback = 1
        "#,
    );

    let (outcomes, _) = replay(&script);

    let statuses: Vec<bool> = outcomes.iter().map(StepOutcome::is_success).collect();
    assert_eq!(statuses, vec![false, true, false]);
    match &outcomes[2].result {
        Outcome::Error { error, .. } => assert_eq!(*error, "invalid_cid"),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn out_of_context_deliveries_reach_the_sink() {
    let script = script(
        r#"
        [[steps]]
        thread = 20
        op = "set_hook"
        id = 15
        event_min = 0x8000
        event_max = 0x8fff
        callback = 0xE
        module = "a11y.dll"

        [[steps]]
        thread = 10
        op = "start_hook_chain"
        id = 15
        event = 0x8001
        target = { window = 12, object_id = -4 }
        "#,
    );

    let (outcomes, log) = replay(&script);

    assert!(outcomes.iter().all(StepOutcome::is_success));
    let deliveries = log.for_destination(20);
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].delivery.window, 12);
    assert_eq!(deliveries[0].delivery.module.as_deref(), Some("a11y.dll"));
}

#[test]
fn outcome_serializes_as_one_flat_object() {
    let success = StepOutcome {
        step: 1,
        thread: Some(ThreadId(10)),
        op: "finish_hook_chain",
        result: Outcome::Success {
            reply: Some(Reply::FinishHookChain),
        },
    };
    let failure = StepOutcome {
        step: 2,
        thread: None,
        op: "process_exit",
        result: Outcome::Error {
            error: "invalid_cid",
            message: "Unknown client id: process 0009".to_string(),
        },
    };

    assert_eq!(
        serde_json::to_value(&success).unwrap(),
        serde_json::json!({
            "step": 1,
            "thread": 10,
            "op": "finish_hook_chain",
            "status": "success",
            "reply": null,
        })
    );
    assert_eq!(
        serde_json::to_value(&failure).unwrap(),
        serde_json::json!({
            "step": 2,
            "op": "process_exit",
            "status": "error",
            "error": "invalid_cid",
            "message": "Unknown client id: process 0009",
        })
    );
}

#[test]
fn loads_json_by_extension() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "processes": [{{ "pid": 1, "threads": [10] }}],
            "steps": [{{ "thread": 10, "op": "finish_hook_chain", "id": 5 }}]
        }}"#
    )
    .unwrap();

    let script = ReplayScript::load(file.path()).unwrap();

    assert_eq!(script.steps.len(), 1);
    assert_eq!(script.steps[0].action.op(), "finish_hook_chain");
}

#[parameterized(
    duplicate_process = { "[[processes]]\npid = 1\n[[processes]]\npid = 1" },
    duplicate_thread = { "[[processes]]\npid = 1\nthreads = [3, 3]" },
    undeclared_thread = { "[[steps]]\nthread = 9\nop = \"shutdown\"" },
    missing_thread = { "[[steps]]\nop = \"finish_hook_chain\"\nid = 5" },
)]
fn rejects_invalid_script(content: &str) {
    let err = ReplayScript::from_toml(content).unwrap_err();

    assert!(matches!(err, ScriptError::Validation(_)), "{}", err);
}

#[parameterized(
    unknown_op = { "[[steps]]\nop = \"call_hook\"" },
    unknown_top_level = { "sessions = []" },
)]
fn rejects_malformed_script(content: &str) {
    let err = ReplayScript::from_toml(content).unwrap_err();

    assert!(matches!(err, ScriptError::Toml(_)), "{}", err);
}
