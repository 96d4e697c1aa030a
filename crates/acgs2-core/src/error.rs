// crates/acgs2-core/src/error.rs
// ============================================================================
// Module: ACGS-2 Error Taxonomy
// Description: The seven governance-wide error kinds every component maps into.
// Purpose: Give every crate one shared top-level error to chain `#[from]` into.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Per-crate errors (router, deliberation, saga, guard, policy generator, audit,
//! bundle) each define their own `thiserror` enum for their local failure modes,
//! then convert into this shared taxonomy at their public boundary, the way the
//! Decision Gate broker converts `SourceError`/`SinkError` into `BrokerError`.

use thiserror::Error;

/// The seven governance-wide error kinds named in spec §7.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// A constitutional hash mismatch anywhere. Fatal; audit and reject.
    #[error("constitutional hash mismatch: expected {expected}, got {actual}")]
    ConstitutionalViolation {
        /// The fixed reference hash.
        expected: &'static str,
        /// The offending value observed.
        actual: String,
    },

    /// Malformed input: empty message, missing required field, bad enum value.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The policy guard returned `deny`.
    #[error("policy denied: {0}")]
    PolicyDenied(String),

    /// A deadline elapsed (deliberation, signatures, review, saga step, verifier).
    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// An external verifier tool exited non-zero or its output failed to parse.
    #[error("verifier error: {0}")]
    VerifierError(String),

    /// I/O or corruption while persisting durable state.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Unclassified internal failure. Fail-closed.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl GovernanceError {
    /// Builds a [`GovernanceError::ConstitutionalViolation`] from a mismatched candidate.
    #[must_use]
    pub fn constitutional_violation(actual: impl Into<String>) -> Self {
        Self::ConstitutionalViolation {
            expected: crate::constitutional::CONSTITUTIONAL_HASH,
            actual: actual.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::use_debug,
        reason = "test-only assertions"
    )]
    use super::*;

    #[test]
    fn constitutional_violation_carries_the_reference_hash() {
        let err = GovernanceError::constitutional_violation("bad-hash");
        match err {
            GovernanceError::ConstitutionalViolation { expected, actual } => {
                assert_eq!(expected, crate::constitutional::CONSTITUTIONAL_HASH);
                assert_eq!(actual, "bad-hash");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
