// crates/acgs2-audit/src/error.rs
// ============================================================================
// Module: Audit Errors
// ============================================================================

use acgs2_core::error::GovernanceError;
use acgs2_core::hashing::HashError;
use thiserror::Error;

/// Failure modes for the audit ledger.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Canonical JSON hashing failed for an entry's payload.
    #[error("failed to hash audit entry: {0}")]
    Hashing(#[from] HashError),

    /// Integrity verification found a broken link in the chain.
    #[error("audit chain broken at entry index {index}: expected prev_hash {expected}, found {actual}")]
    ChainBroken {
        /// Index of the first entry whose `prev_hash` does not match.
        index: usize,
        /// The hash that was expected, based on the preceding entry.
        expected: String,
        /// The hash actually stored on the entry.
        actual: String,
    },
}

impl From<AuditError> for GovernanceError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Hashing(source) => Self::InternalError(source.to_string()),
            AuditError::ChainBroken { .. } => Self::InternalError(err.to_string()),
        }
    }
}
