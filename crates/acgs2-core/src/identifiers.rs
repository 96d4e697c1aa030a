// crates/acgs2-core/src/identifiers.rs
// ============================================================================
// Module: ACGS-2 Identifiers
// Description: Canonical opaque identifiers shared across the governance core.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every entity named in the governance data model carries an opaque identifier
//! rather than a bare `String`, so that mixing up (for example) an `AgentId` and
//! a `TenantId` is a type error instead of a silent bug.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Macro
// ============================================================================

macro_rules! opaque_string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

opaque_string_id! {
    /// Identifies a single `Message` across its lifetime.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    MessageId
}

opaque_string_id! {
    /// Identifies the agent that sent or is targeted by a `Message`.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    AgentId
}

opaque_string_id! {
    /// Identifies the tenant a `Message` is scoped to.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    TenantId
}

opaque_string_id! {
    /// Identifies a `DeliberationItem` in the deliberation queue.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    ItemId
}

opaque_string_id! {
    /// Identifies a saga instance across its forward and compensation phases.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    SagaId
}

opaque_string_id! {
    /// Names a single saga step; unique within its owning saga's step order.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    StepName
}

opaque_string_id! {
    /// Identifies a `VerifiedPolicy`; derived from a hash of its canonical contents.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    PolicyId
}

opaque_string_id! {
    /// Identifies a `PolicySpecification` submitted to the verified policy generator.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    SpecId
}

opaque_string_id! {
    /// Identifies a governance decision subject to signature or review collection.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    DecisionId
}

opaque_string_id! {
    /// Identifies a registered critic agent in the policy guard's review pool.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    CriticId
}

opaque_string_id! {
    /// Identifies a signing key used to produce a bundle manifest signature.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    KeyId
}

opaque_string_id! {
    /// Identifies an audit ledger entry.
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
    AuditEntryId
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "test-only assertions"
    )]
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let id = MessageId::new("msg-1");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"msg-1\"");
        let back: MessageId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn displays_as_raw_string() {
        let id = AgentId::from("agent-7");
        assert_eq!(id.to_string(), "agent-7");
        assert_eq!(id.as_str(), "agent-7");
    }
}
