// crates/acgs2-deliberation/src/error.rs
// ============================================================================
// Module: Deliberation Errors
// ============================================================================

use acgs2_core::error::GovernanceError;
use acgs2_core::identifiers::ItemId;
use thiserror::Error;

/// Failure modes specific to the deliberation queue.
#[derive(Debug, Error)]
pub enum DeliberationError {
    /// No item exists under this ID.
    #[error("no deliberation item with id {0}")]
    ItemNotFound(ItemId),
}

impl From<DeliberationError> for GovernanceError {
    fn from(err: DeliberationError) -> Self {
        match err {
            DeliberationError::ItemNotFound(id) => {
                Self::ValidationFailed(format!("no deliberation item with id {id}"))
            }
        }
    }
}
