// crates/acgs2-bundle/src/schema.rs
// ============================================================================
// Module: Bundle Manifest Schema
// Description: JSON Schema validation of a bundle manifest's required fields.
// Dependencies: jsonschema
// ============================================================================

use acgs2_core::CONSTITUTIONAL_HASH;
use jsonschema::Draft;
use serde_json::Value;

use crate::error::BundleError;

/// Builds the JSON Schema every bundle manifest must satisfy: a semver
/// version, a 40-character hex revision, the fixed constitutional hash, a
/// non-empty root list, and an ISO-8601 timestamp.
fn manifest_schema() -> Value {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["version", "revision", "constitutional_hash", "roots", "timestamp"],
        "properties": {
            "version": {
                "type": "string",
                "pattern": r"^\d+\.\d+\.\d+"
            },
            "revision": {
                "type": "string",
                "pattern": "^[0-9a-f]{40}$"
            },
            "constitutional_hash": {
                "const": CONSTITUTIONAL_HASH
            },
            "roots": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 1
            },
            "timestamp": {
                "type": "string",
                "format": "date-time"
            },
            "signatures": {
                "type": "array"
            },
            "metadata": {
                "type": "object"
            }
        }
    })
}

/// Validates `instance` (a serialized bundle manifest) against the bundle
/// manifest JSON Schema, failing closed on the first violation.
///
/// # Errors
/// Returns [`BundleError::SchemaInvalid`] if the schema itself fails to
/// compile or if `instance` violates it.
pub fn validate_manifest_schema(instance: &Value) -> Result<(), BundleError> {
    let schema = manifest_schema();
    let validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|err| BundleError::SchemaInvalid(format!("invalid schema: {err}")))?;

    let messages: Vec<String> = validator.iter_errors(instance).map(|err| err.to_string()).collect();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(BundleError::SchemaInvalid(messages.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;

    fn valid_instance() -> Value {
        serde_json::json!({
            "version": "1.0.0",
            "revision": "a".repeat(40),
            "constitutional_hash": CONSTITUTIONAL_HASH,
            "roots": ["acgs/governance"],
            "timestamp": "2026-01-01T00:00:00Z",
            "signatures": [],
            "metadata": {}
        })
    }

    #[test]
    fn accepts_a_well_formed_manifest() {
        assert!(validate_manifest_schema(&valid_instance()).is_ok());
    }

    #[test]
    fn rejects_a_missing_required_field() {
        let mut instance = valid_instance();
        instance.as_object_mut().expect("object").remove("version");
        assert!(validate_manifest_schema(&instance).is_err());
    }

    #[test]
    fn rejects_an_empty_roots_list() {
        let mut instance = valid_instance();
        instance["roots"] = serde_json::json!([]);
        assert!(validate_manifest_schema(&instance).is_err());
    }

    #[test]
    fn rejects_a_revision_that_is_not_forty_hex_characters() {
        let mut instance = valid_instance();
        instance["revision"] = serde_json::json!("abc123");
        assert!(validate_manifest_schema(&instance).is_err());
    }

    #[test]
    fn rejects_a_wrong_constitutional_hash() {
        let mut instance = valid_instance();
        instance["constitutional_hash"] = serde_json::json!("not-the-hash");
        assert!(validate_manifest_schema(&instance).is_err());
    }
}
