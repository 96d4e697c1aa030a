// crates/acgs2-policy-gen/src/spec.rs
// ============================================================================
// Module: Policy Specification
// Description: The natural-language input to the Propose-Solve-Verify loop.
// ============================================================================

use acgs2_core::identifiers::SpecId;
use acgs2_core::CONSTITUTIONAL_HASH;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// A natural-language policy specification submitted for verified generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySpecification {
    /// Identity of this specification.
    pub spec_id: SpecId,
    /// The natural-language description of the desired policy.
    pub natural_language: String,
    /// Governance domain this policy applies to (`"access_control"`, `"resource_management"`, ...).
    pub domain: String,
    /// Declared criticality: `"low" | "medium" | "high" | "critical"`.
    pub criticality: String,
    /// Opaque caller-supplied context carried through to the generated sources.
    pub context: Value,
    /// The constitutional hash this specification was authored under.
    pub constitutional_hash: String,
}

impl PolicySpecification {
    /// Builds a specification with the default domain/criticality and the
    /// current constitutional hash.
    #[must_use]
    pub fn new(spec_id: SpecId, natural_language: impl Into<String>) -> Self {
        Self {
            spec_id,
            natural_language: natural_language.into(),
            domain: "general".to_owned(),
            criticality: "medium".to_owned(),
            context: Value::Object(serde_json::Map::new()),
            constitutional_hash: CONSTITUTIONAL_HASH.to_owned(),
        }
    }

    /// Returns a copy whose natural-language text has `suffix` appended, used
    /// by the propose stage to carry extra constraints into the next
    /// iteration without mutating the caller's original specification.
    #[must_use]
    pub fn with_expanded_text(&self, suffix: &str) -> Self {
        Self { natural_language: format!("{} {suffix}", self.natural_language), ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;

    #[test]
    fn new_carries_the_constitutional_hash() {
        let spec = PolicySpecification::new(SpecId::from("s1"), "admins can do anything");
        assert_eq!(spec.constitutional_hash, CONSTITUTIONAL_HASH);
        assert_eq!(spec.domain, "general");
    }

    #[test]
    fn expanded_text_appends_without_mutating_original() {
        let spec = PolicySpecification::new(SpecId::from("s1"), "base");
        let expanded = spec.with_expanded_text("extra constraint");
        assert_eq!(spec.natural_language, "base");
        assert_eq!(expanded.natural_language, "base extra constraint");
    }
}
