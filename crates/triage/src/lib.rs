//! Prompt triage decision engine.
//!
//! Given a user prompt, decides whether the host pipeline should hand it to a
//! multi-step coordination agent, sizes the expected cost, and renders the
//! context block the host injects before doing any work.
//!
//! ## Architectural Layer
//!
//! **Business logic.** This crate has no I/O dependencies. Reading the host
//! envelope, writing the response and managing log files live in the `hook`
//! crate; log events emitted here go to whatever `tracing` dispatcher the
//! caller has installed.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Opaque host identifiers (`SessionId`, `WorkingDirectory`) and `InvocationId` |
//! | [`types`] | Value types (`TokenCount`, `TokenCost`, `ComplexityTier`, `ReasonCode`, `Request`) |
//! | [`classifier`] | The ordered rule list and [`classify`] |
//! | [`cost`] | The static per-tier cost table |
//! | [`context`] | Payload rendering |

pub mod classifier;
pub mod context;
pub mod cost;
pub mod identifiers;
pub mod types;

pub use classifier::{classify, PromptFeatures, Rule, RULES};
pub use context::{render, ContextPayload, COORDINATOR_AGENT};
pub use cost::CostEstimate;
pub use identifiers::{InvocationId, SessionId, WorkingDirectory, UNKNOWN_SENTINEL};
pub use types::{ComplexityTier, Decision, ReasonCode, Request, TokenCost, TokenCount};

/// Everything one decision cycle produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub decision: Decision,
    pub estimate: CostEstimate,
    pub payload: ContextPayload,
}

/// Runs classification, cost estimation and rendering for one request.
pub fn triage(request: &Request) -> Outcome {
    let decision = classify(request);
    let estimate = cost::estimate_for_prompt(decision.tier, request.word_count());
    let payload = render(&request.prompt, &decision, &estimate);
    Outcome {
        decision,
        estimate,
        payload,
    }
}
