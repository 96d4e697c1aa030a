// crates/acgs2-bundle/src/error.rs
// ============================================================================
// Module: Bundle Errors
// ============================================================================

use acgs2_core::GovernanceError;
use thiserror::Error;

/// Failure modes of bundle manifest construction, signing, and verification.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The manifest failed JSON Schema validation.
    #[error("manifest failed schema validation: {0}")]
    SchemaInvalid(String),

    /// The manifest's constitutional hash did not match the fixed reference value.
    #[error("constitutional hash mismatch: expected {expected}, got {actual}")]
    ConstitutionalMismatch {
        /// The fixed reference hash.
        expected: &'static str,
        /// The offending value observed on the manifest.
        actual: String,
    },

    /// The manifest content could not be canonicalized for digesting.
    #[error("failed to canonicalize manifest: {0}")]
    Canonicalization(String),

    /// A hex-encoded key or signature was malformed or the wrong length.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// An Ed25519 signing or verification operation failed.
    #[error("signature operation failed: {0}")]
    SignatureFailed(String),
}

impl From<BundleError> for GovernanceError {
    fn from(err: BundleError) -> Self {
        match err {
            BundleError::ConstitutionalMismatch { actual, .. } => Self::constitutional_violation(actual),
            BundleError::SchemaInvalid(reason) => Self::ValidationFailed(reason),
            other => Self::InternalError(other.to_string()),
        }
    }
}
