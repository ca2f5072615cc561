// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server configuration loaded from TOML.

use crate::handles::MAX_USER_HANDLES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Validation(String),
}

/// Log output format
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_max_handles() -> usize {
    MAX_USER_HANDLES
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Capacity of the user handle table (default and maximum: 32744)
    #[serde(default = "default_max_handles")]
    pub max_handles: usize,

    /// Log filter directives, used when `RUST_LOG` is unset
    #[serde(default)]
    pub log_filter: Option<String>,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_handles: default_max_handles(),
            log_filter: None,
            log_format: LogFormat::Text,
        }
    }
}

impl ServerConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_handles == 0 || self.max_handles > MAX_USER_HANDLES {
            return Err(ConfigError::Validation(format!(
                "max_handles must be between 1 and {}, got {}",
                MAX_USER_HANDLES, self.max_handles
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
