// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch over the thread registry and the hook tables.
//!
//! Each request runs to completion before the next is handled. The only
//! state that survives between the requests of one chain walk lives in the
//! hook tables themselves.

use crate::config::ServerConfig;
use crate::dispatch::EventSink;
use crate::error::HookError;
use crate::handles::UserHandleTable;
use crate::hooks::{ChainEvent, HookKind, HookRegistry, Registration, TableSnapshot};
use crate::ids::{CallbackToken, ProcessId, ThreadId};
use crate::protocol::{
    FinishHookChain, GetNextHook, HookReply, RemoveHook, Reply, Request, SetHook, StartHookChain,
};
use crate::threads::{ThreadInfo, ThreadRegistry};
use tracing::{debug, info, trace};

/// Hook server state: threads, hooks, and where out-of-context events go
pub struct HookServer {
    threads: ThreadRegistry,
    hooks: HookRegistry,
    sink: Box<dyn EventSink>,
}

impl HookServer {
    /// Create a server with default limits
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        Self::with_config(&ServerConfig::default(), sink)
    }

    pub fn with_config(config: &ServerConfig, sink: Box<dyn EventSink>) -> Self {
        let handles = UserHandleTable::new(config.max_handles);
        Self {
            threads: ThreadRegistry::new(),
            hooks: HookRegistry::with_handles(Box::new(handles)),
            sink,
        }
    }

    pub fn threads(&self) -> &ThreadRegistry {
        &self.threads
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn create_process(&mut self, pid: ProcessId) -> Result<(), HookError> {
        self.threads.create_process(pid)
    }

    pub fn create_thread(&mut self, pid: ProcessId, tid: ThreadId) -> Result<ThreadInfo, HookError> {
        self.threads.create_thread(pid, tid)
    }

    /// Handle one request issued by thread `current`.
    ///
    /// A failed request leaves every table as it was.
    pub fn handle(&mut self, current: ThreadId, request: Request) -> Result<Reply, HookError> {
        let current = self.threads.thread(current)?;
        trace!(thread = %current.tid, op = request.op(), "request");
        let result = match request {
            Request::SetHook(req) => self.set_hook(&current, req),
            Request::RemoveHook(req) => self.remove_hook(&current, req),
            Request::StartHookChain(req) => self.start_hook_chain(&current, req),
            Request::GetNextHook(req) => self.get_next_hook(&current, req),
            Request::FinishHookChain(req) => self.finish_hook_chain(&current, req),
        };
        if let Err(ref e) = result {
            debug!(thread = %current.tid, status = e.status(), error = %e, "request failed");
        }
        result
    }

    fn set_hook(&mut self, current: &ThreadInfo, req: SetHook) -> Result<Reply, HookError> {
        let kind = HookKind::from_id(req.id)?;
        let callback = required_callback(req.callback)?;
        let process = req
            .pid
            .map(|pid| self.threads.process(pid))
            .transpose()?;
        let thread = req
            .tid
            .map(|tid| self.threads.thread(tid))
            .transpose()?;
        if let (Some(process), Some(thread)) = (process, thread) {
            if thread.process() != process {
                return Err(HookError::invalid_parameter(format!(
                    "thread {} does not belong to process {}",
                    thread.tid, process.pid
                )));
            }
        }

        let handle = self.hooks.add_hook(
            current,
            Registration {
                kind,
                event_min: req.event_min,
                event_max: req.event_max,
                flags: req.flags,
                callback,
                unicode: req.unicode,
                process,
                thread,
                module: req.module,
            },
        )?;
        Ok(Reply::SetHook {
            handle,
            active_hooks: self.hooks.active_hooks(current),
        })
    }

    fn remove_hook(&mut self, current: &ThreadInfo, req: RemoveHook) -> Result<Reply, HookError> {
        match req.handle {
            Some(handle) => self.hooks.remove_by_handle(handle)?,
            None => {
                let kind = HookKind::from_id(req.id)?;
                let callback = required_callback(req.callback)?;
                self.hooks.remove_by_callback(current, kind, callback)?;
            }
        }
        Ok(Reply::RemoveHook {
            active_hooks: self.hooks.active_hooks(current),
        })
    }

    fn start_hook_chain(
        &mut self,
        current: &ThreadInfo,
        req: StartHookChain,
    ) -> Result<Reply, HookError> {
        let kind = HookKind::from_id(req.id)?;
        let active_hooks = self.hooks.active_hooks(current);
        let ev = ChainEvent {
            current,
            event: req.event,
            target: req.target,
        };
        let hook = self.hooks.start_chain(kind, &ev, self.sink.as_mut());
        Ok(Reply::StartHookChain {
            active_hooks,
            hook: hook.map(HookReply::from),
        })
    }

    fn get_next_hook(&mut self, current: &ThreadInfo, req: GetNextHook) -> Result<Reply, HookError> {
        let ev = ChainEvent {
            current,
            event: req.event,
            target: req.target,
        };
        let (prev_unicode, hook) = self.hooks.next_hook(req.handle, &ev, self.sink.as_mut())?;
        Ok(Reply::GetNextHook {
            prev_unicode,
            hook: hook.map(HookReply::from),
        })
    }

    fn finish_hook_chain(
        &mut self,
        current: &ThreadInfo,
        req: FinishHookChain,
    ) -> Result<Reply, HookError> {
        let kind = HookKind::from_id(req.id)?;
        self.hooks.finish_chain(current, kind)?;
        Ok(Reply::FinishHookChain)
    }

    /// A thread went away: drop its low-level hooks and its queue's table
    pub fn thread_exit(&mut self, tid: ThreadId) -> Result<(), HookError> {
        let info = self.threads.exit_thread(tid)?;
        let low_level = self.hooks.purge_low_level(info.tid);
        let queued = self.hooks.destroy_queue_table(info.queue);
        info!(thread = %tid, low_level, queued, "thread exited");
        Ok(())
    }

    /// A process went away: every one of its threads exits first
    pub fn process_exit(&mut self, pid: ProcessId) -> Result<(), HookError> {
        let threads = self.threads.threads_of(pid)?.to_vec();
        for tid in threads {
            self.thread_exit(tid)?;
        }
        self.threads.exit_process(pid)?;
        info!(process = %pid, "process exited");
        Ok(())
    }

    /// Free the global table and every hook in it
    pub fn shutdown(&mut self) {
        let count = self.hooks.close_global();
        info!(count, "hook server shut down");
    }

    /// Current contents of every table, global first
    pub fn snapshot(&self) -> Vec<TableSnapshot> {
        self.hooks.snapshot()
    }
}

fn required_callback(raw: u64) -> Result<CallbackToken, HookError> {
    CallbackToken::new(raw).ok_or_else(|| HookError::invalid_parameter("empty callback"))
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
