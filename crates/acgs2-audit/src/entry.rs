// crates/acgs2-audit/src/entry.rs
// ============================================================================
// Module: Audit Entry
// Description: C7 — a single hash-chained event recorded by the audit ledger.
// ============================================================================

use acgs2_core::identifiers::AgentId;
use acgs2_core::identifiers::AuditEntryId;
use acgs2_core::UtcInstant;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// The kind of governance event an [`AuditEntry`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A message was routed to the fast lane or deliberation.
    MessageRouted,
    /// A deliberation item resolved (approved, rejected, consensus, or timeout).
    DeliberationResolved,
    /// A saga step executed.
    SagaStepExecuted,
    /// A saga step was compensated.
    SagaCompensated,
    /// The policy guard reached a verdict.
    PolicyDecision,
    /// A bundle manifest was signed.
    BundleSigned,
    /// A constitutional hash mismatch was detected anywhere in the system.
    ConstitutionalViolation,
}

impl AuditEventType {
    /// Returns the snake_case wire label for this event type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MessageRouted => "message_routed",
            Self::DeliberationResolved => "deliberation_resolved",
            Self::SagaStepExecuted => "saga_step_executed",
            Self::SagaCompensated => "saga_compensated",
            Self::PolicyDecision => "policy_decision",
            Self::BundleSigned => "bundle_signed",
            Self::ConstitutionalViolation => "constitutional_violation",
        }
    }
}

/// A single, immutable, hash-chained record.
///
/// `hash` is computed over `prev_hash` plus the canonical JSON of every other
/// field, so altering or reordering any past entry invalidates every hash
/// that follows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier for this entry.
    pub id: AuditEntryId,
    /// What kind of event this is.
    pub event_type: AuditEventType,
    /// Who or what caused the event.
    pub actor: AgentId,
    /// When the event was recorded.
    pub recorded_at: UtcInstant,
    /// Arbitrary structured detail about the event.
    pub detail: Value,
    /// Short, caller-supplied label for how the event resolved, e.g.
    /// `"allow"`, `"rejected"`, `"timed_out"`.
    pub outcome: String,
    /// The constitutional hash in force when this entry was recorded.
    pub constitutional_hash: String,
    /// Hex-encoded hash of the entry immediately before this one in the chain.
    pub prev_hash: String,
    /// Hex-encoded hash of this entry, chained from `prev_hash`.
    pub hash: String,
}

/// The fields hashed together to produce an entry's chain link, kept
/// separate from [`AuditEntry`] so the hash excludes itself.
#[derive(Serialize)]
pub(crate) struct ChainLinkPayload<'a> {
    pub id: &'a AuditEntryId,
    pub event_type: AuditEventType,
    pub actor: &'a AgentId,
    pub recorded_at: UtcInstant,
    pub detail: &'a Value,
    pub outcome: &'a str,
    pub constitutional_hash: &'a str,
}
