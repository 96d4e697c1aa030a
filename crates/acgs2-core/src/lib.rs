// crates/acgs2-core/src/lib.rs
// ============================================================================
// Crate: acgs2-core
// Description: Shared entities, identifiers, hashing, time, and error taxonomy
//              for the ACGS-2 Constitutional Governance Core.
// ============================================================================

//! ## Overview
//! `acgs2-core` has no external-service dependencies: it is the vocabulary every
//! other governance crate shares (identifiers, the message model, canonical
//! hashing, wall-clock time, the constitutional hash invariant, and the
//! top-level error taxonomy).

pub mod constitutional;
pub mod error;
pub mod hashing;
pub mod identifiers;
pub mod message;
pub mod time;

pub use constitutional::CONSTITUTIONAL_HASH;
pub use constitutional::verify_constitutional_hash;
pub use error::GovernanceError;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use identifiers::AgentId;
pub use identifiers::AuditEntryId;
pub use identifiers::CriticId;
pub use identifiers::DecisionId;
pub use identifiers::ItemId;
pub use identifiers::KeyId;
pub use identifiers::MessageId;
pub use identifiers::PolicyId;
pub use identifiers::SagaId;
pub use identifiers::SpecId;
pub use identifiers::StepName;
pub use identifiers::TenantId;
pub use message::ContentMap;
pub use message::Message;
pub use message::MessageStatus;
pub use message::MessageType;
pub use message::Priority;
pub use time::UtcInstant;
