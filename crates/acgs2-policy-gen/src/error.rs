// crates/acgs2-policy-gen/src/error.rs
// ============================================================================
// Module: Policy Generator Errors
// ============================================================================

use acgs2_core::GovernanceError;
use thiserror::Error;

/// Failure modes of the verified policy generator.
#[derive(Debug, Error)]
pub enum PolicyGenError {
    /// The external formal verifier could not be invoked (missing binary, I/O
    /// failure, or the 30s wall-clock budget elapsed).
    #[error("formal verifier failed: {0}")]
    VerifierFailed(String),
}

impl From<PolicyGenError> for GovernanceError {
    fn from(err: PolicyGenError) -> Self {
        match err {
            PolicyGenError::VerifierFailed(reason) => Self::VerifierError(reason),
        }
    }
}
