//! Rendering of the text block injected into the host's context.
//!
//! There are exactly two shapes: the delegation block, which tells the host to
//! consult the coordinator and put a three-option menu in front of the user,
//! and the simple-query block, which tells the host to answer directly.

use serde::{Deserialize, Serialize};

use crate::{CostEstimate, Decision};

/// Sub-agent the host is told to launch before doing any work.
pub const COORDINATOR_AGENT: &str = "master-orchestrator";

/// Rendered context for the host. Empty only on the failure path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextPayload(String);

impl ContextPayload {
    /// The payload emitted when the decision cycle could not complete.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ContextPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders the payload for `decision`.
///
/// `estimate` is only embedded in the delegation shape.
pub fn render(prompt: &str, decision: &Decision, estimate: &CostEstimate) -> ContextPayload {
    if decision.needs_delegation {
        render_delegation(prompt, decision, estimate)
    } else {
        render_simple(prompt)
    }
}

fn render_delegation(prompt: &str, decision: &Decision, estimate: &CostEstimate) -> ContextPayload {
    ContextPayload(format!(
        r#"
<orchestrator-analysis-required>
ORCHESTRATOR INTERCEPTION ACTIVE

BEFORE responding to the user, you MUST:

1. Launch the {agent} agent using the Task tool with subagent_type="{agent}"

2. Pass this user prompt to the orchestrator for complexity analysis:
   USER PROMPT: "{prompt}"

3. Classification hint: {reason}
   Estimated complexity: {tier}

4. COST ESTIMATION (based on initial classification):
   - Orchestrator analysis: ~{analysis} tokens
   - Estimated agent execution: ~{execution} tokens
   - Total estimated: ~{total} tokens
   - Approximate cost: {cost} USD

   Note: Actual costs may vary based on orchestrator's final strategy.

5. The orchestrator will:
   - Assess complexity (Simple/Moderate/High)
   - Determine optimal execution strategy (direct tools vs single agent vs multi-agent)
   - Recommend agent count and decomposition (if multi-agent)
   - Provide detailed execution plan with time estimates
   - Refine cost estimates based on strategy

6. Present the orchestrator's plan to the user with these options:
   ┌─────────────────────────────────────────┐
   │ [1] Execute Plan                        │
   │     → Proceed with orchestrator's       │
   │       recommended approach              │
   │                                         │
   │ [2] Modify Plan                         │
   │     → User provides feedback to adjust  │
   │       strategy (agent count, approach)  │
   │                                         │
   │ [3] Skip Orchestration                  │
   │     → Handle directly without           │
   │       multi-agent coordination          │
   └─────────────────────────────────────────┘

7. Only after user approval, execute according to the chosen approach.

CRITICAL RULES:
- Do NOT start any work until orchestrator has analyzed
- Do NOT proceed without user approval of the plan
- Present cost estimates clearly in the plan
- If user chooses [3], handle task directly without orchestrator
- Log decision and execution to hook logs
</orchestrator-analysis-required>
"#,
        agent = COORDINATOR_AGENT,
        prompt = prompt,
        reason = decision.reason.label(),
        tier = decision.tier.label(),
        analysis = estimate.analysis_tokens.grouped(),
        execution = estimate.execution_tokens.grouped(),
        total = estimate.total_tokens.grouped(),
        cost = estimate.cost_usd,
    ))
}

fn render_simple(prompt: &str) -> ContextPayload {
    ContextPayload(format!(
        r#"
<simple-query-detected>
This prompt has been classified as a simple informational query.
Handle directly without orchestration overhead.

Query: "{prompt}"
</simple-query-detected>
"#
    ))
}
