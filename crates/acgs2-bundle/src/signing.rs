// crates/acgs2-bundle/src/signing.rs
// ============================================================================
// Module: Bundle Signing and Verification
// Description: Ed25519 sign/verify over a manifest's canonical digest, plus
//              the Cosign-compatible variant that signs an external OCI
//              manifest digest instead.
// Dependencies: ed25519-dalek
// ============================================================================

use acgs2_core::identifiers::KeyId;
use acgs2_core::UtcInstant;
use ed25519_dalek::Signature;
use ed25519_dalek::Signer;
use ed25519_dalek::SigningKey;
use ed25519_dalek::Verifier;
use ed25519_dalek::VerifyingKey;

use crate::error::BundleError;
use crate::manifest::BundleManifest;
use crate::manifest::BundleSignature;
use crate::manifest::SignatureAlgorithm;

/// Signs `manifest`'s canonical digest with `signing_key`, appending the
/// resulting [`BundleSignature`] and returning it.
///
/// # Errors
/// Returns [`BundleError::Canonicalization`] if the manifest cannot be
/// digested.
pub fn sign_manifest(
    manifest: &mut BundleManifest,
    keyid: KeyId,
    signing_key: &SigningKey,
    now: UtcInstant,
) -> Result<BundleSignature, BundleError> {
    let digest = manifest.digest()?;
    let digest_bytes = hex_decode(&digest.value).map_err(BundleError::InvalidKeyMaterial)?;
    let signature = signing_key.sign(&digest_bytes);

    let entry =
        BundleSignature { keyid, sig_hex: hex_encode(&signature.to_bytes()), alg: SignatureAlgorithm::Ed25519, ts: now };
    tracing::info!(keyid = entry.keyid.as_str(), revision = manifest.revision.as_str(), "signed bundle manifest");
    manifest.add_signature(entry.clone());
    Ok(entry)
}

/// Verifies that at least one of `manifest`'s signatures validates against
/// `public_key_hex` over the manifest's own canonical digest.
///
/// # Errors
/// Returns [`BundleError::InvalidKeyMaterial`] if `public_key_hex` is not a
/// well-formed 32-byte hex-encoded Ed25519 key, and
/// [`BundleError::Canonicalization`] if the manifest cannot be digested.
/// A manifest with no valid signature is reported as `Ok(false)`, not an
/// error, matching §4.8's "accept if at least one signature validates".
pub fn verify_manifest(manifest: &BundleManifest, public_key_hex: &str) -> Result<bool, BundleError> {
    if manifest.signatures.is_empty() {
        return Ok(false);
    }
    let verifying_key = decode_verifying_key(public_key_hex)?;
    let digest = manifest.digest()?;
    let digest_bytes = hex_decode(&digest.value).map_err(BundleError::InvalidKeyMaterial)?;

    let valid = manifest
        .signatures
        .iter()
        .filter(|entry| entry.alg == SignatureAlgorithm::Ed25519)
        .any(|entry| verify_hex_signature(&verifying_key, &entry.sig_hex, &digest_bytes));
    if !valid {
        tracing::warn!(revision = manifest.revision.as_str(), "no signature on this manifest validated");
    }
    Ok(valid)
}

/// Signs a Cosign-compatible artifact: the payload is `manifest_digest`'s hex
/// string bytes (the external OCI manifest digest), not the bundle's own
/// canonical digest.
///
/// # Errors
/// Returns [`BundleError::SignatureFailed`] only if the underlying Ed25519
/// operation itself fails, which does not occur for a well-formed key.
pub fn sign_cosign_digest(signing_key: &SigningKey, manifest_digest: &str) -> String {
    let signature = signing_key.sign(manifest_digest.as_bytes());
    hex_encode(&signature.to_bytes())
}

/// Verifies a Cosign-compatible signature over `manifest_digest` (an OCI
/// manifest digest hex string) using `public_key_hex`.
///
/// # Errors
/// Returns [`BundleError::InvalidKeyMaterial`] if either hex value is
/// malformed or the wrong length.
pub fn verify_cosign_signature(
    manifest_digest: &str,
    signature_hex: &str,
    public_key_hex: &str,
) -> Result<bool, BundleError> {
    let verifying_key = decode_verifying_key(public_key_hex)?;
    Ok(verify_hex_signature(&verifying_key, signature_hex, manifest_digest.as_bytes()))
}

/// Decodes a hex-encoded 32-byte Ed25519 public key.
fn decode_verifying_key(public_key_hex: &str) -> Result<VerifyingKey, BundleError> {
    let key_bytes = hex_decode(public_key_hex)
        .and_then(|bytes| <[u8; 32]>::try_from(bytes).map_err(|_| "public key must be 32 bytes".to_owned()))
        .map_err(BundleError::InvalidKeyMaterial)?;
    VerifyingKey::from_bytes(&key_bytes).map_err(|err| BundleError::InvalidKeyMaterial(err.to_string()))
}

/// Verifies a hex-encoded 64-byte Ed25519 signature over `message`, reporting
/// any malformed input as a failed verification rather than an error.
fn verify_hex_signature(verifying_key: &VerifyingKey, signature_hex: &str, message: &[u8]) -> bool {
    let Ok(sig_bytes) = hex_decode(signature_hex) else { return false };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(sig_bytes) else { return false };
    let signature = Signature::from_bytes(&sig_bytes);
    verifying_key.verify(message, &signature).is_ok()
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Decodes a hex string into bytes.
fn hex_decode(value: &str) -> Result<Vec<u8>, String> {
    if value.len() % 2 != 0 {
        return Err("hex string has odd length".to_owned());
    }
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&value[i..i + 2], 16).map_err(|err| err.to_string()))
        .collect()
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
    fn a_signed_manifest_verifies_against_its_public_key() {
        let signing_key = SigningKey::from_bytes(&[3u8; 32]);
        let mut manifest = sample_manifest();
        sign_manifest(&mut manifest, KeyId::from("key-1"), &signing_key, UtcInstant::now()).expect("sign");

        let public_hex = hex_encode(signing_key.verifying_key().as_bytes());
        assert!(verify_manifest(&manifest, &public_hex).expect("verify"));
    }

    #[test]
    fn verification_fails_against_the_wrong_public_key() {
        let signing_key = SigningKey::from_bytes(&[4u8; 32]);
        let wrong_key = SigningKey::from_bytes(&[5u8; 32]);
        let mut manifest = sample_manifest();
        sign_manifest(&mut manifest, KeyId::from("key-1"), &signing_key, UtcInstant::now()).expect("sign");

        let wrong_public_hex = hex_encode(wrong_key.verifying_key().as_bytes());
        assert!(!verify_manifest(&manifest, &wrong_public_hex).expect("verify"));
    }

    #[test]
    fn a_manifest_with_no_signatures_reports_unverified_without_erroring() {
        let manifest = sample_manifest();
        let signing_key = SigningKey::from_bytes(&[6u8; 32]);
        let public_hex = hex_encode(signing_key.verifying_key().as_bytes());
        assert!(!verify_manifest(&manifest, &public_hex).expect("verify"));
    }

    #[test]
    fn tampering_with_the_manifest_after_signing_invalidates_it() {
        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        let mut manifest = sample_manifest();
        sign_manifest(&mut manifest, KeyId::from("key-1"), &signing_key, UtcInstant::now()).expect("sign");
        manifest.roots.push("acgs/extra".to_owned());

        let public_hex = hex_encode(signing_key.verifying_key().as_bytes());
        assert!(!verify_manifest(&manifest, &public_hex).expect("verify"));
    }

    #[test]
    fn cosign_variant_signs_and_verifies_an_external_digest() {
        let signing_key = SigningKey::from_bytes(&[8u8; 32]);
        let manifest_digest = "sha256:deadbeef";
        let sig_hex = sign_cosign_digest(&signing_key, manifest_digest);

        let public_hex = hex_encode(signing_key.verifying_key().as_bytes());
        assert!(verify_cosign_signature(manifest_digest, &sig_hex, &public_hex).expect("verify"));
        assert!(!verify_cosign_signature("sha256:other", &sig_hex, &public_hex).expect("verify"));
    }
}
