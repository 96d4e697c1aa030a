// crates/acgs2-policy-guard/src/result.rs
// ============================================================================
// Module: Guard Result
// Description: The outcome of a full `verify` call, after signature
//              collection and/or critic review have run to completion.
// ============================================================================

use acgs2_core::identifiers::AgentId;
use acgs2_core::identifiers::CriticId;
use acgs2_core::identifiers::PolicyId;
use serde::Deserialize;
use serde::Serialize;

use crate::decision::PolicyDecision;

/// The decision tag carried on a [`GuardResult`], independent of the payload
/// (signers/reviewers) that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDecisionKind {
    /// The action was allowed.
    Allow,
    /// The action was denied.
    Deny,
    /// The action required signature collection.
    RequireSignatures,
    /// The action required critic review.
    RequireReview,
}

impl From<&PolicyDecision> for GuardDecisionKind {
    fn from(decision: &PolicyDecision) -> Self {
        match decision {
            PolicyDecision::Allow => Self::Allow,
            PolicyDecision::Deny => Self::Deny,
            PolicyDecision::RequireSignatures { .. } => Self::RequireSignatures,
            PolicyDecision::RequireReview { .. } => Self::RequireReview,
        }
    }
}

/// The final outcome of a `verify` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardResult {
    /// Which branch of the policy decision tree was taken.
    pub decision: GuardDecisionKind,
    /// Whether the action may proceed. `true` only once any required
    /// signatures or review have also resolved favorably.
    pub is_allowed: bool,
    /// The policy that produced this result, if known.
    pub policy_id: Option<PolicyId>,
    /// Fatal validation errors encountered, in the order they were raised.
    pub validation_errors: Vec<String>,
    /// Non-fatal warnings surfaced by the policy or the collectors.
    pub validation_warnings: Vec<String>,
    /// Agents whose signatures were required, if any.
    pub required_signers: Vec<AgentId>,
    /// Critics whose review was required, if any.
    pub required_reviewers: Vec<CriticId>,
    /// Confidence in this result, `[0, 1]`. `1.0` for a plain allow/deny;
    /// lower once signature/review collection only partially resolved.
    pub confidence: f64,
}

impl GuardResult {
    /// Builds the terminal `deny` result for an outright policy denial,
    /// before any signature or review collection has started.
    #[must_use]
    pub fn denied(policy_id: Option<PolicyId>, warnings: Vec<String>) -> Self {
        Self {
            decision: GuardDecisionKind::Deny,
            is_allowed: false,
            policy_id,
            validation_errors: Vec::new(),
            validation_warnings: warnings,
            required_signers: Vec::new(),
            required_reviewers: Vec::new(),
            confidence: 1.0,
        }
    }

    /// Builds the terminal `allow` result for a plain policy allow.
    #[must_use]
    pub fn allowed(policy_id: Option<PolicyId>, warnings: Vec<String>) -> Self {
        Self {
            decision: GuardDecisionKind::Allow,
            is_allowed: true,
            policy_id,
            validation_errors: Vec::new(),
            validation_warnings: warnings,
            required_signers: Vec::new(),
            required_reviewers: Vec::new(),
            confidence: 1.0,
        }
    }
}
