// crates/acgs2-bundle/src/manifest.rs
// ============================================================================
// Module: Bundle Manifest
// Description: The signed, schema-validated artifact describing a published
//              policy bundle.
// ============================================================================

use acgs2_core::identifiers::KeyId;
use acgs2_core::UtcInstant;
use acgs2_core::CONSTITUTIONAL_HASH;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;

use crate::error::BundleError;
use crate::schema::validate_manifest_schema;

/// An algorithm a [`BundleSignature`] was produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    /// Standard Ed25519 over the manifest's own canonical digest.
    Ed25519,
}

/// A single signature entry attached to a [`BundleManifest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleSignature {
    /// The signing key's identity.
    pub keyid: KeyId,
    /// Hex-encoded Ed25519 signature bytes.
    #[serde(rename = "sig")]
    pub sig_hex: String,
    /// The signing algorithm.
    pub alg: SignatureAlgorithm,
    /// When this signature was produced.
    pub ts: UtcInstant,
}

/// A schema-validated, content-addressed policy bundle manifest.
///
/// `signatures` is excluded from the canonical digest computed by
/// [`BundleManifest::digest`], so appending a signature never invalidates an
/// earlier one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Semantic version of the bundle.
    pub version: String,
    /// 40-character git SHA this bundle was built from.
    pub revision: String,
    /// The constitutional hash this bundle was authored under.
    pub constitutional_hash: String,
    /// ISO-8601 UTC creation timestamp.
    pub timestamp: String,
    /// Non-empty list of policy roots this bundle covers.
    pub roots: Vec<String>,
    /// Ed25519 (or Cosign-compatible) signatures over this manifest's digest.
    pub signatures: Vec<BundleSignature>,
    /// Caller-supplied metadata, not interpreted by this crate.
    pub metadata: Value,
}

/// The subset of [`BundleManifest`] fields hashed to produce its canonical
/// digest: every field except `signatures`.
#[derive(Serialize)]
struct DigestPayload<'a> {
    version: &'a str,
    revision: &'a str,
    constitutional_hash: &'a str,
    timestamp: &'a str,
    roots: &'a [String],
    metadata: &'a Value,
}

impl BundleManifest {
    /// Builds a new manifest under the current constitutional hash, stamped
    /// with `now`.
    ///
    /// # Errors
    /// Returns [`BundleError::SchemaInvalid`] if `roots` is empty or
    /// `revision` is not 40 hex characters, and
    /// [`BundleError::ConstitutionalMismatch`] is never produced here since
    /// the hash is always the fixed reference value.
    pub fn new(
        version: impl Into<String>,
        revision: impl Into<String>,
        roots: Vec<String>,
        now: UtcInstant,
    ) -> Result<Self, BundleError> {
        let manifest = Self {
            version: version.into(),
            revision: revision.into(),
            constitutional_hash: CONSTITUTIONAL_HASH.to_owned(),
            timestamp: format_timestamp(now),
            roots,
            signatures: Vec::new(),
            metadata: Value::Object(serde_json::Map::new()),
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validates this manifest against the bundle manifest JSON Schema and
    /// confirms its constitutional hash matches the fixed reference value.
    ///
    /// # Errors
    /// Returns [`BundleError::ConstitutionalMismatch`] on a hash mismatch, or
    /// [`BundleError::SchemaInvalid`] if any other required field is missing
    /// or malformed.
    pub fn validate(&self) -> Result<(), BundleError> {
        if self.constitutional_hash != CONSTITUTIONAL_HASH {
            return Err(BundleError::ConstitutionalMismatch {
                expected: CONSTITUTIONAL_HASH,
                actual: self.constitutional_hash.clone(),
            });
        }
        let instance = serde_json::to_value(self)
            .map_err(|err| BundleError::Canonicalization(err.to_string()))?;
        validate_manifest_schema(&instance)
    }

    /// Appends a signature entry. Does not itself verify the signature;
    /// callers are expected to have produced it via [`crate::signing::sign_manifest`].
    pub fn add_signature(&mut self, signature: BundleSignature) {
        self.signatures.push(signature);
    }

    /// Computes this manifest's canonical digest, excluding `signatures`.
    ///
    /// # Errors
    /// Returns [`BundleError::Canonicalization`] if the manifest cannot be
    /// serialized to canonical JSON.
    pub fn digest(&self) -> Result<acgs2_core::hashing::HashDigest, BundleError> {
        let payload = DigestPayload {
            version: &self.version,
            revision: &self.revision,
            constitutional_hash: &self.constitutional_hash,
            timestamp: &self.timestamp,
            roots: &self.roots,
            metadata: &self.metadata,
        };
        acgs2_core::hashing::hash_canonical_json(acgs2_core::hashing::DEFAULT_HASH_ALGORITHM, &payload)
            .map_err(|err| BundleError::Canonicalization(err.to_string()))
    }
}

/// Formats `instant` as an RFC 3339 (ISO-8601) UTC timestamp string.
fn format_timestamp(instant: UtcInstant) -> String {
    instant.as_offset_date_time().format(&Rfc3339).unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_owned())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;

    fn sample_manifest() -> BundleManifest {
        BundleManifest::new("1.0.0", "a".repeat(40), vec!["acgs/governance".to_owned()], UtcInstant::now())
            .expect("valid manifest")
    }

    #[test]
    fn new_manifest_carries_the_constitutional_hash() {
        let manifest = sample_manifest();
        assert_eq!(manifest.constitutional_hash, CONSTITUTIONAL_HASH);
        assert!(manifest.signatures.is_empty());
    }

    #[test]
    fn empty_roots_are_rejected_by_schema_validation() {
        let result = BundleManifest::new("1.0.0", "a".repeat(40), vec![], UtcInstant::now());
        assert!(result.is_err());
    }

    #[test]
    fn digest_is_stable_and_excludes_signatures() {
        let mut manifest = sample_manifest();
        let before = manifest.digest().expect("digest");
        manifest.add_signature(BundleSignature {
            keyid: KeyId::from("key-1"),
            sig_hex: "ab".repeat(64),
            alg: SignatureAlgorithm::Ed25519,
            ts: UtcInstant::now(),
        });
        let after = manifest.digest().expect("digest");
        assert_eq!(before, after);
    }

    #[test]
    fn tampering_with_a_covered_field_changes_the_digest() {
        let manifest = sample_manifest();
        let mut tampered = manifest.clone();
        tampered.roots.push("acgs/extra".to_owned());
        assert_ne!(manifest.digest().expect("digest"), tampered.digest().expect("digest"));
    }
}
