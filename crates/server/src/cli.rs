// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line arguments of the replay tool.

use clap::Parser;
use std::path::PathBuf;

/// Replay scripted hook requests against an in-process hook server
#[derive(Parser, Debug, Clone)]
#[command(name = "hookchain", version, about = "Hook chain server replay tool")]
pub struct Cli {
    /// Replay script (TOML, or JSON with a .json extension)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Server configuration file
    #[arg(long, env = "HOOKCHAIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Append out-of-context deliveries to this file as JSON lines
    #[arg(long, env = "HOOKCHAIN_DELIVERIES")]
    pub deliveries: Option<PathBuf>,

    /// Print the hook tables as JSON after the last step
    #[arg(long)]
    pub dump: bool,

    /// Exit with status 1 if any step fails
    #[arg(long)]
    pub strict: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
