// crates/acgs2-policy-guard/src/decision.rs
// ============================================================================
// Module: Policy Decision
// Description: The outcome shape a `PolicyDecider` returns, and the seam
//              through which the active policy bundle is evaluated.
// ============================================================================

use acgs2_core::identifiers::AgentId;
use acgs2_core::identifiers::CriticId;
use acgs2_core::identifiers::PolicyId;
use thiserror::Error;

use crate::action::GuardAction;
use crate::action::GuardContext;

/// What the active policy bundle decided for a proposed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// The action may proceed unchanged.
    Allow,
    /// The action must not execute.
    Deny,
    /// The action may proceed only once enough of `signers` sign off,
    /// reaching `threshold` signatures.
    RequireSignatures {
        /// Agents whose signatures count toward the threshold.
        signers: Vec<AgentId>,
        /// Number of distinct signatures required.
        threshold: usize,
    },
    /// The action may proceed only once `reviewers` reach consensus.
    RequireReview {
        /// Critics invited to review this decision.
        reviewers: Vec<CriticId>,
        /// Review categories the critics are asked to weigh in on.
        review_types: Vec<String>,
    },
}

/// A decision plus any non-fatal warnings surfaced alongside it.
#[derive(Debug, Clone)]
pub struct PolicyOutcome {
    /// The policy identifier that produced this outcome, if known.
    pub policy_id: Option<PolicyId>,
    /// The decision itself.
    pub decision: PolicyDecision,
    /// Non-fatal warnings the decider wants surfaced to the caller.
    pub warnings: Vec<String>,
}

/// Errors a [`PolicyDecider`] implementation can report.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The decider could not evaluate the action.
    #[error("policy decision error: {0}")]
    DecisionFailed(String),
}

/// Evaluates the currently active policy bundle against a proposed action.
///
/// Concrete implementations (an OPA/Rego evaluator, a static allow/deny list,
/// a verified-policy-generator output) are out-of-scope collaborators reached
/// only through this trait.
pub trait PolicyDecider: Send + Sync {
    /// Evaluates `action` proposed by `agent_id` within `context`.
    ///
    /// # Errors
    /// Returns [`PolicyError`] when policy evaluation itself fails (not when
    /// the policy evaluates to `Deny`, which is a normal outcome).
    fn decide(
        &self,
        agent_id: &AgentId,
        action: &GuardAction,
        context: &GuardContext,
    ) -> Result<PolicyOutcome, PolicyError>;
}
