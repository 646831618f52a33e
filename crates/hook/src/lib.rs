//! Host-facing side of the prompt triage hook.
//!
//! [`run`] performs exactly one decision cycle: read the input envelope,
//! classify, estimate, render, and write the response envelope. Every failure
//! inside the cycle is logged and answered with an empty payload, so the host
//! is never blocked by this component.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** JSON framing, log files and panic containment live
//! here. The [`triage`] crate sees only a [`triage::Request`].

pub mod envelope;
pub mod errors;
pub mod logging;

use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, info, info_span};
use triage::{InvocationId, Outcome};

pub use envelope::{OutputEnvelope, USER_PROMPT_SUBMIT};
pub use errors::HookError;
pub use logging::{CaptureBuffer, LogFormat, LogSettings, LogSink, RotatingFileWriter};

const BANNER_WIDTH: usize = 80;

/// Runs one decision cycle against `input` and `output`, logging to `sink`.
///
/// A response envelope is always written to `output`: the rendered payload
/// on success, or an empty one on failure. The returned value reports what
/// happened and is for diagnostics only.
pub fn run<R: Read, W: Write>(input: R, output: W, sink: &LogSink) -> Result<Outcome, HookError> {
    sink.in_scope(|| {
        let invocation = InvocationId::new_random();
        let span = info_span!("decision_cycle", invocation = %invocation);
        let _entered = span.enter();

        let result = guarded(|| decide(input));
        let envelope = match &result {
            Ok(outcome) => OutputEnvelope::user_prompt_submit(outcome.payload.clone()),
            Err(err) => {
                error!(error = %err, "Hook error");
                error!("Full error chain: {}", err.chain());
                OutputEnvelope::empty()
            }
        };

        let written = write_envelope(output, &envelope);
        match &written {
            Ok(()) => info!("Hook completed successfully"),
            Err(err) => error!("Full error chain: {}", err.chain()),
        }
        info!("{}", "=".repeat(BANNER_WIDTH));

        let outcome = result?;
        written.map(|()| outcome)
    })
}

fn decide<R: Read>(mut input: R) -> Result<Outcome, HookError> {
    let mut raw = String::new();
    input.read_to_string(&mut raw).map_err(HookError::Read)?;
    let request = envelope::decode(&raw)?;

    info!("{}", "=".repeat(BANNER_WIDTH));
    info!("Hook triggered - Session: {}", request.session_id);
    info!("CWD: {}", request.cwd);
    info!("Prompt: {}", request.prompt);

    let outcome = triage::triage(&request);
    let decision = &outcome.decision;

    info!(
        "Decision: {}",
        if decision.needs_delegation { "ORCHESTRATE" } else { "SKIP" }
    );
    info!("Reason: {}", decision.reason);
    info!("Complexity: {}", decision.tier);
    if decision.needs_delegation {
        info!(
            "Cost estimate: {} USD (~{} tokens)",
            outcome.estimate.cost_usd,
            outcome.estimate.total_tokens.grouped()
        );
    } else {
        info!("No orchestration needed - simple query");
    }

    Ok(outcome)
}

fn write_envelope<W: Write>(mut output: W, envelope: &OutputEnvelope) -> Result<(), HookError> {
    let line = envelope::encode(envelope)?;
    writeln!(output, "{line}").map_err(HookError::Write)?;
    output.flush().map_err(HookError::Write)
}

/// Runs `f`, converting a panic into [`HookError::Panicked`].
fn guarded<T>(f: impl FnOnce() -> Result<T, HookError>) -> Result<T, HookError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Err(HookError::Panicked { message })
    })
}
