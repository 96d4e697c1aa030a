// crates/acgs2-bundle/src/lib.rs
// ============================================================================
// Crate: acgs2-bundle
// Description: C8 — schema-validated, Ed25519-signed policy bundle manifests.
// ============================================================================

//! ## Overview
//! [`manifest::BundleManifest`] is validated against the bundle manifest JSON
//! Schema on construction (required fields, 40-hex revision, fixed
//! constitutional hash, non-empty roots). [`signing::sign_manifest`] and
//! [`signing::verify_manifest`] cover the standard Ed25519 path over the
//! manifest's own canonical digest; [`signing::sign_cosign_digest`] and
//! [`signing::verify_cosign_signature`] cover the Cosign-compatible variant,
//! whose payload is an external OCI manifest digest instead. OCI
//! registry push/pull and secrets/KMS fronting are out of scope for this
//! crate; see `acgs2-contract` for those collaborator seams.

pub mod error;
pub mod manifest;
pub mod schema;
pub mod signing;

pub use error::BundleError;
pub use manifest::BundleManifest;
pub use manifest::BundleSignature;
pub use manifest::SignatureAlgorithm;
pub use schema::validate_manifest_schema;
pub use signing::sign_cosign_digest;
pub use signing::sign_manifest;
pub use signing::verify_cosign_signature;
pub use signing::verify_manifest;
