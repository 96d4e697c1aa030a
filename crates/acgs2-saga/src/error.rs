// crates/acgs2-saga/src/error.rs
// ============================================================================
// Module: Saga Errors
// ============================================================================

use acgs2_core::error::GovernanceError;
use thiserror::Error;

/// Failure modes for saga persistence backends.
#[derive(Debug, Error)]
pub enum SagaStoreError {
    /// I/O failure while reading or writing persisted state.
    #[error("saga store io error: {0}")]
    Io(String),

    /// Persisted state failed to parse; treated as a crashed-writer partial
    /// write rather than a hard failure, per the durability contract.
    #[error("saga store corrupt for {saga_id}: {reason}")]
    Corrupt {
        /// The saga whose persisted document could not be parsed.
        saga_id: String,
        /// Why parsing failed.
        reason: String,
    },
}

/// Failure modes for the saga orchestrator.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The persistence backend failed.
    #[error(transparent)]
    Store(#[from] SagaStoreError),

    /// A step referenced a compensation index with no matching entry.
    #[error("step {step} references an unknown compensation index {index}")]
    UnknownCompensation {
        /// The step whose compensation reference is invalid.
        step: String,
        /// The out-of-range index.
        index: usize,
    },
}

impl From<SagaError> for GovernanceError {
    fn from(err: SagaError) -> Self {
        match err {
            SagaError::Store(source) => Self::PersistenceError(source.to_string()),
            SagaError::UnknownCompensation { .. } => Self::InternalError(err.to_string()),
        }
    }
}
