// crates/acgs2-policy-guard/src/error.rs
// ============================================================================
// Module: Policy Guard Errors
// ============================================================================

use acgs2_core::error::GovernanceError;
use acgs2_core::identifiers::CriticId;
use acgs2_core::identifiers::DecisionId;
use thiserror::Error;

/// Failure modes specific to the policy guard.
#[derive(Debug, Error)]
pub enum PolicyGuardError {
    /// The action carried a constitutional hash that does not match the
    /// fixed reference value.
    #[error("constitutional hash mismatch: expected {expected}, got {actual}")]
    ConstitutionalMismatch {
        /// The fixed reference hash.
        expected: &'static str,
        /// The offending value observed on the action.
        actual: String,
    },

    /// The active policy denied the action outright.
    #[error("policy denied the action: {0:?}")]
    Denied(Vec<String>),

    /// The injected [`crate::decision::PolicyDecider`] failed to produce a decision.
    #[error("policy decision failed: {0}")]
    DeciderFailed(String),

    /// No decision is pending under this id.
    #[error("no pending decision with id {0}")]
    UnknownDecision(DecisionId),

    /// No critic is registered under this id.
    #[error("no critic registered with id {0}")]
    UnknownCritic(CriticId),

    /// A critic was already registered under this id.
    #[error("critic {0} is already registered")]
    CriticAlreadyRegistered(CriticId),
}

impl From<PolicyGuardError> for GovernanceError {
    fn from(err: PolicyGuardError) -> Self {
        match err {
            PolicyGuardError::ConstitutionalMismatch { actual, .. } => {
                Self::constitutional_violation(actual)
            }
            PolicyGuardError::Denied(reasons) => Self::PolicyDenied(reasons.join("; ")),
            PolicyGuardError::DeciderFailed(reason) => Self::InternalError(reason),
            PolicyGuardError::UnknownDecision(id) => {
                Self::ValidationFailed(format!("no pending decision with id {id}"))
            }
            PolicyGuardError::UnknownCritic(id) => {
                Self::ValidationFailed(format!("no critic registered with id {id}"))
            }
            PolicyGuardError::CriticAlreadyRegistered(id) => {
                Self::ValidationFailed(format!("critic {id} is already registered"))
            }
        }
    }
}
