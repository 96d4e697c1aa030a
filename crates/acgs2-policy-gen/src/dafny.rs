// crates/acgs2-policy-gen/src/dafny.rs
// ============================================================================
// Module: Dafny Template Generation
// Description: Selects and fills a Dafny-style formal specification template
//              by heuristics on the specification text.
// ============================================================================

use acgs2_core::CONSTITUTIONAL_HASH;
use acgs2_impact_scorer::keywords::HIGH_IMPACT_KEYWORDS;

use crate::spec::PolicySpecification;

const RECURSIVE_KEYWORDS: &[&str] = &["recursive", "swarm", "hierarchy", "sub-agent"];

/// Generates the Dafny module for `spec`, selecting the recursive, resource,
/// or generic template by keyword heuristics and tagging it `[CRITICAL]` when
/// the rendered Rego policy carries a high-impact keyword.
#[must_use]
pub fn generate_dafny(spec: &PolicySpecification, rego_policy: &str) -> String {
    let rego_lower = rego_policy.to_lowercase();
    let nl_lower = spec.natural_language.to_lowercase();
    let policy_id = short_id(spec.spec_id.as_str());

    let critical_tag = if HIGH_IMPACT_KEYWORDS.iter().any(|kw| rego_lower.contains(kw)) {
        "// [CRITICAL] High-impact governance path\n"
    } else {
        ""
    };

    if RECURSIVE_KEYWORDS.iter().any(|kw| nl_lower.contains(kw)) {
        return recursive_template(policy_id, critical_tag);
    }
    if nl_lower.contains("resource") || nl_lower.contains("owner") {
        return resource_template(policy_id, critical_tag);
    }
    generic_template(policy_id, critical_tag)
}

fn generic_template(policy_id: &str, critical_tag: &str) -> String {
    format!(
        "// Global Constitutional Hash: {CONSTITUTIONAL_HASH}\n{critical_tag}module Policy_{policy_id} {{\n    predicate ValidHash(input_hash: string) {{\n        input_hash == \"{CONSTITUTIONAL_HASH}\"\n    }}\n\n    method Evaluate(input_hash: string) returns (allowed: bool)\n        requires ValidHash(input_hash)\n        ensures allowed ==> ValidHash(input_hash)\n    {{\n        allowed := true;\n    }}\n}}"
    )
}

fn recursive_template(policy_id: &str, critical_tag: &str) -> String {
    format!(
        "// Global Constitutional Hash: {CONSTITUTIONAL_HASH}\n{critical_tag}// [RECURSIVE] Hierarchical swarm governance enabled\nmodule Policy_{policy_id} {{\n    predicate IsConstitutional(policy: string) {{\n        policy == \"{CONSTITUTIONAL_HASH}\"\n    }}\n\n    codatatype AgentSwarm =\n        | Leaf(policy: string)\n        | Node(policy: string, children: seq<AgentSwarm>)\n\n    copredicate ValidSwarm(s: AgentSwarm) {{\n        match s\n        case Leaf(p) => IsConstitutional(p)\n        case Node(p, kids) => IsConstitutional(p) && forall k :: k in kids ==> ValidSwarm(k)\n    }}\n\n    method Evaluate(s: AgentSwarm) returns (allowed: bool)\n        ensures allowed ==> ValidSwarm(s)\n    {{\n        if ValidSwarm(s) {{\n            allowed := true;\n        }} else {{\n            allowed := false;\n        }}\n    }}\n}}"
    )
}

fn resource_template(policy_id: &str, critical_tag: &str) -> String {
    format!(
        "// Global Constitutional Hash: {CONSTITUTIONAL_HASH}\n{critical_tag}// [RESOURCE] Fine-grained resource permission model\nmodule Policy_{policy_id} {{\n    type User = string\n    type Resource = string\n    type Action = string\n\n    predicate IsAdmin(u: User) {{\n        u == \"admin\"\n    }}\n\n    predicate IsOwner(u: User, r: Resource) {{\n        u == \"owner_\" + r\n    }}\n\n    predicate HasPermission(u: User, a: Action, r: Resource) {{\n        IsAdmin(u) || (a == \"read\") || (a == \"delete\" && IsOwner(u, r))\n    }}\n\n    method Evaluate(u: User, a: Action, r: Resource) returns (allowed: bool)\n        ensures allowed ==> HasPermission(u, a, r)\n    {{\n        if IsAdmin(u) || (a == \"read\") || (a == \"delete\" && IsOwner(u, r)) {{\n            allowed := true;\n        }} else {{\n            allowed := false;\n        }}\n    }}\n}}"
    )
}

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
    fn high_impact_keyword_is_tagged_critical() {
        let spec = PolicySpecification::new(SpecId::from("s1"), "Emergency governance breach protocol.");
        let dafny = generate_dafny(&spec, "# security breach");
        assert!(dafny.contains("[CRITICAL] High-impact governance path"));
    }

    #[test]
    fn recursive_keyword_selects_swarm_template() {
        let spec = PolicySpecification::new(SpecId::from("s2"), "A policy with recursive dependency checking for sub-agent operations.");
        let dafny = generate_dafny(&spec, "package constitutional.x");
        assert!(dafny.contains("[RECURSIVE]"));
        assert!(dafny.contains("ValidSwarm"));
    }

    #[test]
    fn resource_keyword_selects_ownership_template() {
        let spec = PolicySpecification::new(
            SpecId::from("s3"),
            "Allow owners to delete their resources, and admins can do everything.",
        );
        let dafny = generate_dafny(&spec, "package constitutional.x");
        assert!(dafny.contains("[RESOURCE]"));
        assert!(dafny.contains("predicate IsOwner"));
    }

    #[test]
    fn plain_specification_falls_back_to_generic_template() {
        let spec = PolicySpecification::new(SpecId::from("s4"), "A simple routine status policy.");
        let dafny = generate_dafny(&spec, "package constitutional.x");
        assert!(!dafny.contains("[RECURSIVE]"));
        assert!(!dafny.contains("[RESOURCE]"));
        assert!(dafny.contains("predicate ValidHash"));
    }
}
