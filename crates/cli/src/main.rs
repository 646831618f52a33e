//! Prompt triage hook entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: flags and `TRIAGE_HOOK_*` environment
//!    variables, all of which configure the log sink.
//! 2. **Build the log sink**: a rotating file sink, or a stderr-only sink if
//!    the log directory is unusable.
//! 3. **Run one decision cycle** over stdin/stdout via [`hook::run`].
//!
//! The process exits with success in every case. A failing hook must never
//! block the host's prompt.

mod config;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use hook::LogSink;
use tracing::{error, warn};

use crate::config::HookConfig;

fn main() -> ExitCode {
    let mut startup_problems = Vec::new();

    let config = match HookConfig::try_parse() {
        Ok(config) => config,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            startup_problems.push(anyhow::Error::new(err).context("Invalid arguments, using defaults"));
            HookConfig::default()
        }
    };
    let config = match config.validate() {
        Ok(()) => config,
        Err(err) => {
            startup_problems.push(err.context("Invalid configuration, using defaults"));
            HookConfig::default()
        }
    };

    let sink = match open_sink(&config) {
        Ok(sink) => sink,
        Err(err) => {
            let sink = LogSink::stderr_only();
            sink.in_scope(|| error!("{err:#}"));
            sink
        }
    };
    for problem in &startup_problems {
        sink.in_scope(|| warn!("{problem:#}"));
    }

    // The result is already logged and an envelope already written.
    let _ = hook::run(io::stdin().lock(), io::stdout().lock(), &sink);
    drop(sink);

    ExitCode::SUCCESS
}

fn open_sink(config: &HookConfig) -> Result<LogSink> {
    let settings = config.log_settings();
    LogSink::open(&settings)
        .with_context(|| format!("Could not open hook log at {}", settings.path().display()))
}
