// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hook chain replay tool entry point.

use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hookchain::capture::DeliveryLog;
use hookchain::cli::Cli;
use hookchain::config::{LogFormat, ServerConfig};
use hookchain::script::{ReplayScript, StepOutcome};
use hookchain::server::HookServer;

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout carries only step outcomes.
fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_filter.as_deref().unwrap_or("info"))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Replay the script; returns whether the run counts as successful.
fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    init_tracing(&config);

    let script = ReplayScript::load(&cli.script)?;
    let log = match &cli.deliveries {
        Some(path) => DeliveryLog::with_file(path)?,
        None => DeliveryLog::new(),
    };
    let mut server = HookServer::with_config(&config, Box::new(log.clone()));
    script.populate(&mut server)?;

    let outcomes = script.run(&mut server);
    let mut stdout = std::io::stdout().lock();
    for outcome in &outcomes {
        writeln!(stdout, "{}", serde_json::to_string(outcome)?)?;
    }
    if cli.dump {
        let dump = serde_json::json!({ "tables": server.snapshot() });
        writeln!(stdout, "{}", dump)?;
    }
    stdout.flush()?;

    if let Some(e) = log.take_write_error() {
        return Err(format!(
            "Failed to write deliveries file ({} not written): {}",
            log.write_failures(),
            e
        )
        .into());
    }

    Ok(!cli.strict || outcomes.iter().all(StepOutcome::is_success))
}
