// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process and thread registry.
//!
//! Every thread owns one message queue. The queue is the target a thread-scoped
//! hook is attached to, so its hook table lives exactly as long as the thread.
//!
//! Process ids may be reused once a process has exited. Each process creation
//! also gets a serial that is never reused, so state keyed on a process can
//! tell a new process apart from an exited one with the same id.

use crate::error::HookError;
use crate::ids::{ProcessId, QueueId, ThreadId};
use std::collections::{BTreeMap, HashMap};

/// One creation of a process
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessRef {
    pub pid: ProcessId,
    /// Unique across the registry's lifetime
    pub serial: u64,
}

/// Registry entry for a live thread
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreadInfo {
    pub tid: ThreadId,
    pub pid: ProcessId,
    /// Serial of the owning process
    pub process_serial: u64,
    pub queue: QueueId,
}

impl ThreadInfo {
    pub fn process(&self) -> ProcessRef {
        ProcessRef {
            pid: self.pid,
            serial: self.process_serial,
        }
    }
}

#[derive(Debug, Default)]
struct ProcessEntry {
    serial: u64,
    threads: Vec<ThreadId>,
}

#[derive(Debug, Default)]
pub struct ThreadRegistry {
    processes: BTreeMap<ProcessId, ProcessEntry>,
    threads: HashMap<ThreadId, ThreadInfo>,
    next_queue: u32,
    next_serial: u64,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new process
    pub fn create_process(&mut self, pid: ProcessId) -> Result<(), HookError> {
        if self.processes.contains_key(&pid) {
            return Err(HookError::invalid_parameter(format!(
                "process {} already exists",
                pid
            )));
        }
        self.next_serial += 1;
        self.processes.insert(
            pid,
            ProcessEntry {
                serial: self.next_serial,
                threads: Vec::new(),
            },
        );
        Ok(())
    }

    /// Register a new thread in an existing process, giving it a fresh queue
    pub fn create_thread(&mut self, pid: ProcessId, tid: ThreadId) -> Result<ThreadInfo, HookError> {
        if self.threads.contains_key(&tid) {
            return Err(HookError::invalid_parameter(format!(
                "thread {} already exists",
                tid
            )));
        }
        let process = self
            .processes
            .get_mut(&pid)
            .ok_or_else(|| HookError::InvalidCid(format!("process {}", pid)))?;
        self.next_queue += 1;
        let info = ThreadInfo {
            tid,
            pid,
            process_serial: process.serial,
            queue: QueueId(self.next_queue),
        };
        process.threads.push(tid);
        self.threads.insert(tid, info);
        Ok(info)
    }

    /// Look up a live thread
    pub fn thread(&self, tid: ThreadId) -> Result<ThreadInfo, HookError> {
        self.threads
            .get(&tid)
            .copied()
            .ok_or_else(|| HookError::InvalidCid(format!("thread {}", tid)))
    }

    /// Look up a live process
    pub fn process(&self, pid: ProcessId) -> Result<ProcessRef, HookError> {
        self.processes
            .get(&pid)
            .map(|entry| ProcessRef {
                pid,
                serial: entry.serial,
            })
            .ok_or_else(|| HookError::InvalidCid(format!("process {}", pid)))
    }

    /// Threads of a process, in creation order
    pub fn threads_of(&self, pid: ProcessId) -> Result<&[ThreadId], HookError> {
        self.processes
            .get(&pid)
            .map(|entry| entry.threads.as_slice())
            .ok_or_else(|| HookError::InvalidCid(format!("process {}", pid)))
    }

    /// Remove a thread, returning what it was
    pub fn exit_thread(&mut self, tid: ThreadId) -> Result<ThreadInfo, HookError> {
        let info = self
            .threads
            .remove(&tid)
            .ok_or_else(|| HookError::InvalidCid(format!("thread {}", tid)))?;
        if let Some(process) = self.processes.get_mut(&info.pid) {
            process.threads.retain(|t| *t != tid);
        }
        Ok(info)
    }

    /// Remove a process that has no threads left
    pub fn exit_process(&mut self, pid: ProcessId) -> Result<(), HookError> {
        match self.processes.get(&pid) {
            None => Err(HookError::InvalidCid(format!("process {}", pid))),
            Some(process) if !process.threads.is_empty() => {
                Err(HookError::invalid_parameter(format!(
                    "process {} still has {} threads",
                    pid,
                    process.threads.len()
                )))
            }
            Some(_) => {
                self.processes.remove(&pid);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "threads_tests.rs"]
mod tests;
