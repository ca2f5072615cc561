// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hook chain server
//!
//! Server side of cross-process event interception. Clients register hooks
//! into a session-wide table or into the table of one message queue; a thread
//! producing an event then walks the matching chain over several requests,
//! running each hook's callback in between. Hooks that must run out of
//! context are handed to an [`EventSink`](dispatch::EventSink) instead.
//!
//! [`HookServer`](server::HookServer) is the entry point. The `hookchain`
//! binary replays scripted sessions against it.

#[doc(hidden)]
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handles;
pub mod hooks;
pub mod ids;
pub mod protocol;
pub mod script;
pub mod server;
pub mod threads;

/// Re-exported delivery recording types from the hookchain-capture crate.
pub mod capture {
    pub use hookchain_capture::{CapturedDelivery, DeliveryLog, PostedDelivery};
}
