// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request failure taxonomy.

use crate::ids::UserHandle;
use thiserror::Error;

/// Failure reported back to the requester of a single hook request.
///
/// Every variant leaves the hook tables exactly as they were before the
/// request.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HookError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid hook handle {0}")]
    InvalidHandle(UserHandle),

    #[error("Unknown client id: {0}")]
    InvalidCid(String),

    #[error("User handle table is full")]
    HandleTableFull,
}

impl HookError {
    pub(crate) fn invalid_parameter(msg: impl Into<String>) -> Self {
        HookError::InvalidParameter(msg.into())
    }

    /// Stable status name reported in replies
    pub fn status(&self) -> &'static str {
        match self {
            HookError::InvalidParameter(_) => "invalid_parameter",
            HookError::InvalidHandle(_) => "invalid_handle",
            HookError::InvalidCid(_) => "invalid_cid",
            HookError::HandleTableFull => "no_memory",
        }
    }
}
