//! Static cost table keyed by [`ComplexityTier`].
//!
//! The figures are fixed per tier and do not depend on the prompt. They are a
//! planning aid for the user, not a measurement.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ComplexityTier, TokenCost, TokenCount};

/// Words-to-tokens ratio used for the per-prompt scale factor.
pub const TOKENS_PER_WORD: f64 = 1.3;

/// Expected token usage and cost for delegating a prompt.
///
/// `analysis_tokens + execution_tokens == total_tokens` holds for every value
/// built through [`CostEstimate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Tokens spent by the coordinator analysing the prompt.
    pub analysis_tokens: TokenCount,
    /// Tokens spent by the agents carrying out the plan.
    pub execution_tokens: TokenCount,
    /// Sum of the two phases.
    pub total_tokens: TokenCount,
    /// Approximate cost in USD.
    pub cost_usd: TokenCost,
}

impl CostEstimate {
    const fn from_static(analysis: u64, execution: u64, cost_usd: f64) -> Self {
        Self {
            analysis_tokens: TokenCount::new(analysis),
            execution_tokens: TokenCount::new(execution),
            total_tokens: TokenCount::new(analysis + execution),
            cost_usd: TokenCost::from_static(cost_usd),
        }
    }

    /// Creates an estimate, deriving the total from the two phases.
    pub fn new(analysis: TokenCount, execution: TokenCount, cost_usd: TokenCost) -> Self {
        Self {
            analysis_tokens: analysis,
            execution_tokens: execution,
            total_tokens: analysis + execution,
            cost_usd,
        }
    }
}

const SIMPLE_QUERY: CostEstimate = CostEstimate::from_static(500, 0, 0.0015);
const MODERATE_TASK: CostEstimate = CostEstimate::from_static(1_000, 5_000, 0.018);
const COMPLEX_TASK: CostEstimate = CostEstimate::from_static(2_000, 15_000, 0.051);
const HIGH_COMPLEXITY: CostEstimate = CostEstimate::from_static(3_000, 40_000, 0.129);

/// Returns the fixed estimate for `tier`.
pub fn estimate(tier: ComplexityTier) -> CostEstimate {
    match tier {
        ComplexityTier::SimpleQuery => SIMPLE_QUERY,
        ComplexityTier::ModerateTask => MODERATE_TASK,
        ComplexityTier::ComplexTask => COMPLEX_TASK,
        ComplexityTier::HighComplexity => HIGH_COMPLEXITY,
    }
}

/// Looks up a tier by wire name.
///
/// Unrecognised names resolve to the `moderate_task` row.
pub fn estimate_by_name(tier_name: &str) -> CostEstimate {
    let tier = ComplexityTier::from_name(tier_name).unwrap_or(ComplexityTier::ModerateTask);
    estimate(tier)
}

/// Approximate prompt size in tokens (`word_count × 1.3`).
///
/// Computed and logged for every estimate but not folded into the table
/// values; see DESIGN.md.
pub fn prompt_token_scale(word_count: usize) -> f64 {
    word_count as f64 * TOKENS_PER_WORD
}

/// Returns the estimate for `tier`, logging the unapplied prompt scale factor.
pub fn estimate_for_prompt(tier: ComplexityTier, word_count: usize) -> CostEstimate {
    let scale = prompt_token_scale(word_count);
    let estimate = estimate(tier);
    debug!(
        tier = %tier,
        word_count,
        prompt_token_scale = scale,
        total_tokens = estimate.total_tokens.as_u64(),
        "Cost estimate resolved"
    );
    estimate
}
