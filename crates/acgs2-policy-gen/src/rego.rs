// crates/acgs2-policy-gen/src/rego.rs
// ============================================================================
// Module: Rego-like Policy Translation
// Description: Keyword-driven translation of a natural-language specification
//              into an OPA-style Rego policy body.
// ============================================================================

use acgs2_core::CONSTITUTIONAL_HASH;

use crate::spec::PolicySpecification;

/// Translates `spec` into a Rego-like policy text keyed by `spec_id`.
#[must_use]
pub fn generate_rego(spec: &PolicySpecification) -> String {
    let lowered = spec.natural_language.to_lowercase();
    let policy_id = short_id(spec.spec_id.as_str());

    let mut conditions = Vec::new();
    if lowered.contains("admin") {
        conditions.push("input.user.role == \"admin\"".to_owned());
    }
    if lowered.contains("owner") {
        conditions.push("input.user.id == input.resource.owner_id".to_owned());
    }
    if lowered.contains("delete") {
        if lowered.contains("owner") {
            conditions.push("input.action == \"delete\"".to_owned());
        } else {
            conditions.push("input.action != \"delete\" # denied by default".to_owned());
        }
    }
    if lowered.contains("read") {
        conditions.push("input.action == \"read\"".to_owned());
    }
    if lowered.contains("mfa") || lowered.contains("multi-factor") {
        conditions.push("input.user.mfa_authenticated == true".to_owned());
    }

    let condition_block = if conditions.is_empty() { "true".to_owned() } else { conditions.join("\n    ") };
    let summary: String = spec.natural_language.chars().take(50).collect();

    format!(
        "package constitutional.{policy_id}\n\n# Constitutional Hash: {CONSTITUTIONAL_HASH}\n# Generated from: {summary}\n\ndefault allow = false\n\nallow {{\n    input.constitutional_hash == \"{CONSTITUTIONAL_HASH}\"\n    {condition_block}\n}}\n"
    )
}

/// Truncates an identifier to its first 8 bytes for use in a generated package name.
fn short_id(id: &str) -> &str {
    let end = id.char_indices().nth(8).map_or(id.len(), |(idx, _)| idx);
    &id[..end]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use acgs2_core::identifiers::SpecId;

    use super::*;

    #[test]
    fn admin_and_read_keywords_produce_matching_conditions() {
        let spec = PolicySpecification::new(
            SpecId::from("test_spec_001"),
            "Admins can read and write, but users can only read.",
        );
        let rego = generate_rego(&spec);
        assert!(rego.starts_with("package constitutional.test_spe"));
        assert!(rego.contains("input.user.role == \"admin\""));
        assert!(rego.contains("input.action == \"read\""));
    }

    #[test]
    fn delete_without_owner_denies_by_default() {
        let spec = PolicySpecification::new(SpecId::from("s2"), "Users may delete any resource.");
        let rego = generate_rego(&spec);
        assert!(rego.contains("input.action != \"delete\""));
    }

    #[test]
    fn owner_delete_grants_condition() {
        let spec = PolicySpecification::new(SpecId::from("s3"), "Allow owners to delete their resources.");
        let rego = generate_rego(&spec);
        assert!(rego.contains("input.action == \"delete\""));
        assert!(!rego.contains("denied by default"));
    }
}
