//! Error type for the hook's I/O boundary.
//!
//! None of these errors reach the host: [`crate::run`] logs them and answers
//! with the empty-payload envelope. They exist so the failure is described
//! precisely in the log file.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that end a decision cycle early.
#[derive(Debug, Error)]
pub enum HookError {
    /// Standard input could not be read to the end, or was not UTF-8.
    #[error("Failed to read the input envelope")]
    Read(#[source] std::io::Error),

    /// The input was read but is not a JSON object of the expected shape.
    #[error("Input envelope is malformed")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// The response envelope could not be serialised.
    #[error("Failed to encode the response envelope")]
    Encode(#[source] serde_json::Error),

    /// The response envelope could not be written to the output sink.
    #[error("Failed to write the response envelope")]
    Write(#[source] std::io::Error),

    /// Classification or rendering panicked.
    #[error("Decision cycle panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: String,
    },

    /// The log directory or file could not be prepared.
    #[error("Log sink could not be opened at {path}")]
    LogSink {
        /// Directory or file that failed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HookError {
    /// Renders the error and every `source()` below it, outermost first.
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        rendered
    }
}
