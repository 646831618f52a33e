//! Shared value types for the triage domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (token counts are non-negative integers,
//! costs are finite and non-negative, tiers and reasons are closed sets) and
//! participate in the decision.

use serde::{Deserialize, Serialize};

use crate::{SessionId, WorkingDirectory};

// ---------------------------------------------------------------------------
// Token and cost types
// ---------------------------------------------------------------------------

/// Number of tokens expected to be consumed by one phase of delegated work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenCount(u64);

impl TokenCount {
    /// Creates a [`TokenCount`] from a raw integer.
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns `true` if this count is zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Formats the count with `,` thousands separators (e.g. `43,000`).
    pub fn grouped(self) -> String {
        let digits = self.0.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }
}

impl std::fmt::Display for TokenCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for TokenCount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

// ---------------------------------------------------------------------------

/// Estimated monetary cost of delegated work, expressed in US dollars.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TokenCost(f64);

impl TokenCost {
    /// Creates a [`TokenCost`] from a raw float value (USD).
    ///
    /// Returns `None` if `value` is negative, infinite, or NaN.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value >= 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Builds a cost from a literal known to be finite and non-negative.
    pub(crate) const fn from_static(value: f64) -> Self {
        Self(value)
    }

    /// Returns the underlying `f64` value (USD).
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for TokenCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.3}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Classification outcome
// ---------------------------------------------------------------------------

/// Closed set of effort categories used to size the expected cost of a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    /// Informational question, answered directly.
    SimpleQuery,
    /// Single focused change.
    ModerateTask,
    /// Work spanning several components.
    ComplexTask,
    /// Work spanning layers or the whole codebase.
    HighComplexity,
}

impl ComplexityTier {
    /// Every tier, cheapest first.
    pub const ALL: [ComplexityTier; 4] = [
        ComplexityTier::SimpleQuery,
        ComplexityTier::ModerateTask,
        ComplexityTier::ComplexTask,
        ComplexityTier::HighComplexity,
    ];

    /// Wire name (`snake_case`).
    pub fn as_str(self) -> &'static str {
        match self {
            ComplexityTier::SimpleQuery => "simple_query",
            ComplexityTier::ModerateTask => "moderate_task",
            ComplexityTier::ComplexTask => "complex_task",
            ComplexityTier::HighComplexity => "high_complexity",
        }
    }

    /// Title-cased label shown to the host (e.g. `High Complexity`).
    pub fn label(self) -> &'static str {
        match self {
            ComplexityTier::SimpleQuery => "Simple Query",
            ComplexityTier::ModerateTask => "Moderate Task",
            ComplexityTier::ComplexTask => "Complex Task",
            ComplexityTier::HighComplexity => "High Complexity",
        }
    }

    /// Parses a wire name. Returns `None` for anything outside the closed set.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.as_str() == name)
    }
}

impl std::fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// Identifies which classification rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    SimpleQuery,
    ExplicitRequest,
    CrossLayerWork,
    BroadScope,
    QualitySweep,
    MultiComponent,
    ImplementationTask,
    TooShort,
    DefaultModerate,
}

impl ReasonCode {
    /// Wire name (`snake_case`).
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::SimpleQuery => "simple_query",
            ReasonCode::ExplicitRequest => "explicit_request",
            ReasonCode::CrossLayerWork => "cross_layer_work",
            ReasonCode::BroadScope => "broad_scope",
            ReasonCode::QualitySweep => "quality_sweep",
            ReasonCode::MultiComponent => "multi_component",
            ReasonCode::ImplementationTask => "implementation_task",
            ReasonCode::TooShort => "too_short",
            ReasonCode::DefaultModerate => "default_moderate",
        }
    }

    /// Title-cased label shown to the host (e.g. `Cross Layer Work`).
    pub fn label(self) -> &'static str {
        match self {
            ReasonCode::SimpleQuery => "Simple Query",
            ReasonCode::ExplicitRequest => "Explicit Request",
            ReasonCode::CrossLayerWork => "Cross Layer Work",
            ReasonCode::BroadScope => "Broad Scope",
            ReasonCode::QualitySweep => "Quality Sweep",
            ReasonCode::MultiComponent => "Multi Component",
            ReasonCode::ImplementationTask => "Implementation Task",
            ReasonCode::TooShort => "Too Short",
            ReasonCode::DefaultModerate => "Default Moderate",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// Result of classifying one prompt. Exactly one rule contributes to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the host should hand the prompt to the coordination agent.
    pub needs_delegation: bool,
    /// Rule that fired.
    pub reason: ReasonCode,
    /// Effort category used for the cost estimate.
    pub tier: ComplexityTier,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A prompt submitted by the user, with the host's pass-through metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Request {
    /// Raw prompt text, exactly as submitted.
    pub prompt: String,
    /// Host session; logged, never inspected.
    pub session_id: SessionId,
    /// Host working directory; logged, never inspected.
    pub cwd: WorkingDirectory,
}

impl Request {
    /// Creates a request with sentinel session and working-directory values.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            session_id: SessionId::unknown(),
            cwd: WorkingDirectory::unknown(),
        }
    }

    /// Number of whitespace-delimited words in the prompt.
    pub fn word_count(&self) -> usize {
        self.prompt.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_inserts_thousands_separators() {
        assert_eq!(TokenCount::new(0).grouped(), "0");
        assert_eq!(TokenCount::new(500).grouped(), "500");
        assert_eq!(TokenCount::new(6000).grouped(), "6,000");
        assert_eq!(TokenCount::new(43000).grouped(), "43,000");
        assert_eq!(TokenCount::new(1_234_567).grouped(), "1,234,567");
    }

    #[test]
    fn token_cost_rejects_negative_and_non_finite() {
        assert!(TokenCost::new(-0.01).is_none());
        assert!(TokenCost::new(f64::NAN).is_none());
        assert!(TokenCost::new(f64::INFINITY).is_none());
        assert_eq!(TokenCost::new(0.129).unwrap().to_string(), "$0.129");
    }

    #[test]
    fn tier_names_round_trip_through_from_name() {
        for tier in ComplexityTier::ALL {
            assert_eq!(ComplexityTier::from_name(tier.as_str()), Some(tier));
        }
        assert_eq!(ComplexityTier::from_name("galactic"), None);
    }

    #[test]
    fn serde_uses_snake_case_wire_names() {
        let json = serde_json::to_string(&ReasonCode::CrossLayerWork).unwrap();
        assert_eq!(json, "\"cross_layer_work\"");
        let json = serde_json::to_string(&ComplexityTier::HighComplexity).unwrap();
        assert_eq!(json, "\"high_complexity\"");
    }

    #[test]
    fn word_count_splits_on_any_whitespace() {
        assert_eq!(Request::new("").word_count(), 0);
        assert_eq!(Request::new("   ").word_count(), 0);
        assert_eq!(Request::new("What is\trecursion\n").word_count(), 3);
    }
}
