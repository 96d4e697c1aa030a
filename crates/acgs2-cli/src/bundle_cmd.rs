// crates/acgs2-cli/src/bundle_cmd.rs
// ============================================================================
// Module: Bundle Subcommand
// Description: Signs and verifies policy bundle manifests from the command
//              line, over a caller-supplied Ed25519 key.
// ============================================================================

use acgs2_bundle::sign_manifest;
use acgs2_bundle::verify_manifest;
use acgs2_bundle::BundleError;
use acgs2_bundle::BundleManifest;
use acgs2_core::identifiers::KeyId;
use acgs2_core::UtcInstant;
use ed25519_dalek::SigningKey;

/// Parses a 64-character hex-encoded Ed25519 seed into a [`SigningKey`].
fn parse_signing_key(seed_hex: &str) -> Result<SigningKey, BundleError> {
    let bytes = decode_hex(seed_hex).map_err(BundleError::InvalidKeyMaterial)?;
    let seed: [u8; 32] =
        bytes.try_into().map_err(|_| BundleError::InvalidKeyMaterial("seed must be 32 bytes".to_owned()))?;
    Ok(SigningKey::from_bytes(&seed))
}

fn decode_hex(value: &str) -> Result<Vec<u8>, String> {
    if value.len() % 2 != 0 {
        return Err("hex string must have an even length".to_owned());
    }
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&value[i..i + 2], 16).map_err(|err| err.to_string()))
        .collect()
}

/// Builds a fresh manifest for `version`/`revision`/`roots` and signs it with
/// `seed_hex`, returning the signed manifest.
///
/// # Errors
/// Returns [`BundleError`] if the manifest fails schema validation or
/// `seed_hex` is not a well-formed 32-byte hex seed.
pub fn run_bundle_sign(
    version: &str,
    revision: &str,
    roots: Vec<String>,
    seed_hex: &str,
) -> Result<BundleManifest, BundleError> {
    let mut manifest = BundleManifest::new(version, revision, roots, UtcInstant::now())?;
    let signing_key = parse_signing_key(seed_hex)?;
    sign_manifest(&mut manifest, KeyId::new("cli-key"), &signing_key, UtcInstant::now())?;
    Ok(manifest)
}

/// Verifies that `manifest` carries at least one valid signature under the
/// Ed25519 public key `public_key_hex`.
///
/// # Errors
/// Returns [`BundleError`] if `public_key_hex` is malformed or the manifest
/// cannot be digested.
pub fn run_bundle_verify(manifest: &BundleManifest, public_key_hex: &str) -> Result<bool, BundleError> {
    verify_manifest(manifest, public_key_hex)
}
