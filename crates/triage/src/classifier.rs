//! Ordered, first-match-wins prompt classification.
//!
//! The rule order is part of the contract: a prompt that satisfies several
//! rules is always attributed to the earliest one. [`RULES`] is the single
//! source of that order and can be inspected directly.
//!
//! Matching is a substring test against the lower-cased prompt, so `all`
//! also matches inside `install` or `small`.

use tracing::info;

use crate::{ComplexityTier, Decision, ReasonCode, Request};

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

/// Lead-in phrases that mark an informational question.
pub const SIMPLE_LEAD_INS: &[&str] = &[
    "what is",
    "explain",
    "how do",
    "why does",
    "show me",
    "what does",
    "define",
];

/// Tokens that explicitly ask for the coordinator.
pub const DELEGATION_TRIGGERS: &[&str] = &["orchestrate", "@orchestrate"];

/// Data-layer names; two or more in one prompt means cross-layer work.
pub const LAYER_NAMES: &[&str] = &["bronze", "silver", "gold"];

pub const BROAD_SCOPE_TERMS: &[&str] = &["all", "across", "entire", "multiple", "every"];

pub const QUALITY_ACTION_TERMS: &[&str] = &[
    "linting",
    "formatting",
    "type hints",
    "quality",
    "refactor",
    "optimize",
];

pub const QUALITY_SCOPE_TERMS: &[&str] = &["all", "entire", "project", "codebase"];

pub const PLURAL_UNIT_TERMS: &[&str] = &["files", "tables", "classes", "modules", "components"];

pub const MAGNITUDE_TERMS: &[&str] = &["all", "multiple", "several", "many"];

pub const ACTION_VERBS: &[&str] = &[
    "implement",
    "create",
    "build",
    "add",
    "fix",
    "update",
    "modify",
];

/// A simple-query lead-in only counts for prompts shorter than this.
pub const SIMPLE_QUERY_WORD_LIMIT: usize = 20;

/// An action verb only counts for prompts longer than this.
pub const IMPLEMENTATION_MIN_WORDS: usize = 10;

/// Prompts shorter than this that matched nothing else are not delegated.
pub const TOO_SHORT_WORD_LIMIT: usize = 5;

/// Characters of the prompt echoed into classification log lines.
const LOG_PREVIEW_CHARS: usize = 100;

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// The derived view of a prompt that rule predicates inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptFeatures {
    lowered: String,
    word_count: usize,
}

impl PromptFeatures {
    /// Lower-cases the prompt and counts its words.
    pub fn new(prompt: &str) -> Self {
        Self {
            lowered: prompt.to_lowercase(),
            word_count: prompt.split_whitespace().count(),
        }
    }

    /// Number of whitespace-delimited words.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    fn contains_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|term| self.lowered.contains(term))
    }

    fn count_of(&self, terms: &[&str]) -> usize {
        terms.iter().filter(|term| self.lowered.contains(*term)).count()
    }
}

/// One entry of the ordered rule list: a predicate and the decision it yields.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Upper-case label used in log lines (e.g. `BROAD SCOPE`).
    pub label: &'static str,
    /// Decision produced when the predicate holds.
    pub outcome: Decision,
    predicate: fn(&PromptFeatures) -> bool,
}

impl Rule {
    const fn new(
        label: &'static str,
        needs_delegation: bool,
        reason: ReasonCode,
        tier: ComplexityTier,
        predicate: fn(&PromptFeatures) -> bool,
    ) -> Self {
        Self {
            label,
            outcome: Decision {
                needs_delegation,
                reason,
                tier,
            },
            predicate,
        }
    }

    /// Returns `true` if this rule's predicate holds for `features`.
    pub fn matches(&self, features: &PromptFeatures) -> bool {
        (self.predicate)(features)
    }
}

fn is_simple_query(p: &PromptFeatures) -> bool {
    p.contains_any(SIMPLE_LEAD_INS) && p.word_count < SIMPLE_QUERY_WORD_LIMIT
}

fn is_explicit_request(p: &PromptFeatures) -> bool {
    p.contains_any(DELEGATION_TRIGGERS)
}

fn is_cross_layer(p: &PromptFeatures) -> bool {
    p.count_of(LAYER_NAMES) >= 2
}

fn is_broad_scope(p: &PromptFeatures) -> bool {
    p.contains_any(BROAD_SCOPE_TERMS)
}

fn is_quality_sweep(p: &PromptFeatures) -> bool {
    p.contains_any(QUALITY_ACTION_TERMS) && p.contains_any(QUALITY_SCOPE_TERMS)
}

fn is_multi_component(p: &PromptFeatures) -> bool {
    p.contains_any(PLURAL_UNIT_TERMS) && p.contains_any(MAGNITUDE_TERMS)
}

fn is_implementation_task(p: &PromptFeatures) -> bool {
    p.contains_any(ACTION_VERBS) && p.word_count > IMPLEMENTATION_MIN_WORDS
}

fn is_too_short(p: &PromptFeatures) -> bool {
    p.word_count < TOO_SHORT_WORD_LIMIT
}

fn always(_: &PromptFeatures) -> bool {
    true
}

/// The classification rules in priority order. The last rule always matches.
pub static RULES: [Rule; 9] = [
    Rule::new(
        "SIMPLE QUERY",
        false,
        ReasonCode::SimpleQuery,
        ComplexityTier::SimpleQuery,
        is_simple_query,
    ),
    Rule::new(
        "EXPLICIT ORCHESTRATION REQUEST",
        true,
        ReasonCode::ExplicitRequest,
        ComplexityTier::HighComplexity,
        is_explicit_request,
    ),
    Rule::new(
        "CROSS-LAYER WORK",
        true,
        ReasonCode::CrossLayerWork,
        ComplexityTier::HighComplexity,
        is_cross_layer,
    ),
    Rule::new(
        "BROAD SCOPE",
        true,
        ReasonCode::BroadScope,
        ComplexityTier::ComplexTask,
        is_broad_scope,
    ),
    Rule::new(
        "QUALITY SWEEP",
        true,
        ReasonCode::QualitySweep,
        ComplexityTier::HighComplexity,
        is_quality_sweep,
    ),
    Rule::new(
        "MULTI-COMPONENT WORK",
        true,
        ReasonCode::MultiComponent,
        ComplexityTier::ComplexTask,
        is_multi_component,
    ),
    Rule::new(
        "MODERATE TASK",
        true,
        ReasonCode::ImplementationTask,
        ComplexityTier::ModerateTask,
        is_implementation_task,
    ),
    Rule::new(
        "SIMPLE (too short)",
        false,
        ReasonCode::TooShort,
        ComplexityTier::SimpleQuery,
        is_too_short,
    ),
    Rule::new(
        "DEFAULT MODERATE",
        true,
        ReasonCode::DefaultModerate,
        ComplexityTier::ModerateTask,
        always,
    ),
];

// ---------------------------------------------------------------------------

/// Returns the first rule in [`RULES`] that matches `features`.
pub fn first_match(features: &PromptFeatures) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| rule.matches(features))
        .unwrap_or(&RULES[RULES.len() - 1])
}

/// Classifies a request and records the outcome to the active log sink.
pub fn classify(request: &Request) -> Decision {
    let features = PromptFeatures::new(&request.prompt);
    let rule = first_match(&features);

    let preview: String = request.prompt.chars().take(LOG_PREVIEW_CHARS).collect();
    if rule.outcome.reason == ReasonCode::CrossLayerWork {
        info!(
            reason = %rule.outcome.reason,
            tier = %rule.outcome.tier,
            "Classified as {} ({} layers): {}",
            rule.label,
            features.count_of(LAYER_NAMES),
            preview
        );
    } else {
        info!(
            reason = %rule.outcome.reason,
            tier = %rule.outcome.tier,
            "Classified as {}: {}",
            rule.label,
            preview
        );
    }

    rule.outcome
}
