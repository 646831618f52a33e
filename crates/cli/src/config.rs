//! Command-line and environment configuration for the hook binary.
//!
//! Everything here configures the log sink. The decision engine itself takes
//! no configuration.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use hook::logging::{DEFAULT_MAX_BYTES, DEFAULT_RETENTION_DAYS};
use hook::{LogFormat, LogSettings};

/// Log directory used when neither `--log-dir` nor the environment sets one,
/// relative to the home directory.
const DEFAULT_LOG_SUBDIR: &str = ".claude/hook_logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for LogFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => LogFormat::Text,
            FormatArg::Json => LogFormat::Json,
        }
    }
}

/// Prompt triage hook: reads a `UserPromptSubmit` envelope on stdin and
/// writes the context to inject on stdout.
#[derive(Debug, Clone, Parser)]
#[command(name = "prompt-triage-hook", version, about)]
pub struct HookConfig {
    /// Directory for the hook log [default: ~/.claude/hook_logs]
    #[arg(long, env = "TRIAGE_HOOK_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Name of the active log file inside the log directory.
    #[arg(long, env = "TRIAGE_HOOK_LOG_FILE", default_value = "orchestrator_hook.log")]
    pub log_file: String,

    /// Size at which the log file is rotated, in bytes.
    #[arg(long, env = "TRIAGE_HOOK_LOG_MAX_BYTES", default_value_t = DEFAULT_MAX_BYTES)]
    pub log_max_bytes: u64,

    /// Days a rotated log file is kept.
    #[arg(long, env = "TRIAGE_HOOK_LOG_RETENTION_DAYS", default_value_t = DEFAULT_RETENTION_DAYS)]
    pub log_retention_days: u32,

    /// Filter directive for the log file, e.g. `info` or `triage=debug`.
    #[arg(long, env = "TRIAGE_HOOK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log line encoding.
    #[arg(long, env = "TRIAGE_HOOK_LOG_FORMAT", value_enum, default_value_t = FormatArg::Text)]
    pub log_format: FormatArg,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            log_file: "orchestrator_hook.log".to_string(),
            log_max_bytes: DEFAULT_MAX_BYTES,
            log_retention_days: DEFAULT_RETENTION_DAYS,
            log_level: "info".to_string(),
            log_format: FormatArg::Text,
        }
    }
}

impl HookConfig {
    /// Rejects values the log sink cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.log_max_bytes == 0 {
            bail!("--log-max-bytes must be greater than zero");
        }
        if self.log_file.trim().is_empty() {
            bail!("--log-file must not be empty");
        }
        Ok(())
    }

    /// Resolves the log directory, falling back to the home directory and
    /// then to the current directory.
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_LOG_SUBDIR)
        })
    }

    /// Builds the sink settings from this configuration.
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            dir: self.resolved_log_dir(),
            file_name: self.log_file.clone(),
            max_bytes: self.log_max_bytes,
            retention_days: self.log_retention_days,
            level: self.log_level.clone(),
            format: self.log_format.into(),
        }
    }
}
