// crates/acgs2-contract/src/error.rs
// ============================================================================
// Module: Contract Errors
// Description: Failure modes shared across the external-collaborator seams.
// ============================================================================

use thiserror::Error;

/// Failure modes of an out-of-scope external collaborator.
///
/// A real implementation of any trait in this crate maps its own failure
/// modes into these variants at its boundary, the way every in-scope crate
/// chains into `acgs2_core::GovernanceError`.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The collaborator is unreachable (network, process, or registry down).
    #[error("external collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator rejected the request as invalid.
    #[error("external collaborator rejected request: {0}")]
    Rejected(String),

    /// A secret, artifact, or review decision could not be found.
    #[error("not found: {0}")]
    NotFound(String),
}
