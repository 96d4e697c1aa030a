// crates/acgs2-cli/src/decider.rs
// ============================================================================
// Module: Demo Policy Decider
// Description: A fixed allow/deny-by-threshold decider used to exercise the
//              guard from the command line. Not a policy engine.
// ============================================================================

use acgs2_core::identifiers::AgentId;
use acgs2_policy_guard::GuardAction;
use acgs2_policy_guard::GuardContext;
use acgs2_policy_guard::PolicyDecider;
use acgs2_policy_guard::PolicyDecision;
use acgs2_policy_guard::PolicyError;
use acgs2_policy_guard::PolicyOutcome;

/// Denies any action whose upstream impact score is at or above `deny_at`,
/// allows everything else.
///
/// A real policy bundle (OPA/Rego, or `acgs2-policy-gen`'s verified output)
/// is the intended [`PolicyDecider`]; this one exists only so `acgs2-cli` has
/// something to wire the guard to without depending on an external engine.
pub struct ThresholdDecider {
    deny_at: f64,
}

impl ThresholdDecider {
    /// Builds a decider that denies actions scoring `deny_at` or above.
    #[must_use]
    pub const fn new(deny_at: f64) -> Self {
        Self { deny_at }
    }
}

impl PolicyDecider for ThresholdDecider {
    fn decide(
        &self,
        _agent_id: &AgentId,
        action: &GuardAction,
        _context: &GuardContext,
    ) -> Result<PolicyOutcome, PolicyError> {
        let decision =
            if action.impact_score >= self.deny_at { PolicyDecision::Deny } else { PolicyDecision::Allow };
        Ok(PolicyOutcome { policy_id: None, decision, warnings: Vec::new() })
    }
}
