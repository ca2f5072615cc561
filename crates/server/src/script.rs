// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replay scripts: a session of processes and threads plus an ordered list
//! of requests and lifecycle events to feed through a [`HookServer`].

use crate::error::HookError;
use crate::ids::{ProcessId, ThreadId};
use crate::protocol::{
    FinishHookChain, GetNextHook, RemoveHook, Reply, Request, SetHook, StartHookChain,
};
use crate::server::HookServer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading a replay script
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayScript {
    /// Name for logging
    #[serde(default)]
    pub name: String,

    /// Processes and threads that exist before the first step
    #[serde(default)]
    pub processes: Vec<ProcessSpec>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessSpec {
    pub pid: ProcessId,
    #[serde(default)]
    pub threads: Vec<ThreadId>,
}

/// One step: an action taken by (or happening to) a thread
#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    /// Acting thread; required for everything but `process_exit` and `shutdown`
    #[serde(default)]
    pub thread: Option<ThreadId>,

    #[serde(flatten)]
    pub action: Action,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    SetHook(SetHook),
    RemoveHook(RemoveHook),
    StartHookChain(StartHookChain),
    GetNextHook(GetNextHook),
    FinishHookChain(FinishHookChain),
    /// The acting thread exits
    ThreadExit,
    ProcessExit {
        pid: ProcessId,
    },
    Shutdown,
}

impl Action {
    pub fn op(&self) -> &'static str {
        match self {
            Action::SetHook(_) => "set_hook",
            Action::RemoveHook(_) => "remove_hook",
            Action::StartHookChain(_) => "start_hook_chain",
            Action::GetNextHook(_) => "get_next_hook",
            Action::FinishHookChain(_) => "finish_hook_chain",
            Action::ThreadExit => "thread_exit",
            Action::ProcessExit { .. } => "process_exit",
            Action::Shutdown => "shutdown",
        }
    }

    fn needs_thread(&self) -> bool {
        !matches!(self, Action::ProcessExit { .. } | Action::Shutdown)
    }

    /// The request this action issues, if it is one
    fn request(&self) -> Option<Request> {
        Some(match self {
            Action::SetHook(req) => Request::SetHook(req.clone()),
            Action::RemoveHook(req) => Request::RemoveHook(req.clone()),
            Action::StartHookChain(req) => Request::StartHookChain(req.clone()),
            Action::GetNextHook(req) => Request::GetNextHook(req.clone()),
            Action::FinishHookChain(req) => Request::FinishHookChain(req.clone()),
            Action::ThreadExit | Action::ProcessExit { .. } | Action::Shutdown => return None,
        })
    }
}

/// Result of one replayed step, printed as a JSON line
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// One-based step number
    pub step: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadId>,
    pub op: &'static str,
    #[serde(flatten)]
    pub result: Outcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        reply: Option<Reply>,
    },
    Error {
        error: &'static str,
        message: String,
    },
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.result, Outcome::Success { .. })
    }
}

impl ReplayScript {
    /// Load a script from a TOML or JSON file
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|e| e == "json") {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ScriptError> {
        let script: ReplayScript = toml::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    pub fn from_json(content: &str) -> Result<Self, ScriptError> {
        let script: ReplayScript = serde_json::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<(), ScriptError> {
        let mut pids = HashSet::new();
        let mut tids = HashSet::new();
        for process in &self.processes {
            if !pids.insert(process.pid) {
                return Err(ScriptError::Validation(format!(
                    "process {} declared twice",
                    process.pid
                )));
            }
            for tid in &process.threads {
                if !tids.insert(*tid) {
                    return Err(ScriptError::Validation(format!(
                        "thread {} declared twice",
                        tid
                    )));
                }
            }
        }

        for (i, step) in self.steps.iter().enumerate() {
            match step.thread {
                Some(tid) if !tids.contains(&tid) => {
                    return Err(ScriptError::Validation(format!(
                        "step {} names undeclared thread {}",
                        i + 1,
                        tid
                    )));
                }
                None if step.action.needs_thread() => {
                    return Err(ScriptError::Validation(format!(
                        "step {} ({}) needs a thread",
                        i + 1,
                        step.action.op()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Create the declared processes and threads
    pub fn populate(&self, server: &mut HookServer) -> Result<(), HookError> {
        for process in &self.processes {
            server.create_process(process.pid)?;
            for tid in &process.threads {
                server.create_thread(process.pid, *tid)?;
            }
        }
        Ok(())
    }

    /// Run every step in order. A failing step does not stop the replay.
    pub fn run(&self, server: &mut HookServer) -> Vec<StepOutcome> {
        let outcomes: Vec<StepOutcome> = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                debug!(step = i + 1, op = step.action.op(), "replaying step");
                let result = match apply(server, step) {
                    Ok(reply) => Outcome::Success { reply },
                    Err(e) => Outcome::Error {
                        error: e.status(),
                        message: e.to_string(),
                    },
                };
                StepOutcome {
                    step: i + 1,
                    thread: step.thread,
                    op: step.action.op(),
                    result,
                }
            })
            .collect();
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(script = %self.name, steps = outcomes.len(), failed, "replay finished");
        outcomes
    }
}

fn acting_thread(step: &Step) -> Result<ThreadId, HookError> {
    step.thread
        .ok_or_else(|| HookError::InvalidCid(format!("{} without a thread", step.action.op())))
}

fn apply(server: &mut HookServer, step: &Step) -> Result<Option<Reply>, HookError> {
    if let Some(request) = step.action.request() {
        return server.handle(acting_thread(step)?, request).map(Some);
    }
    match &step.action {
        Action::ThreadExit => server.thread_exit(acting_thread(step)?)?,
        Action::ProcessExit { pid } => server.process_exit(*pid)?,
        Action::Shutdown => server.shutdown(),
        _ => {}
    }
    Ok(None)
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
