// crates/acgs2-audit/src/ledger.rs
// ============================================================================
// Module: Audit Ledger
// Description: C7 — append-only, hash-chained record of governance events.
// Dependencies: acgs2-core (hashing)
// ============================================================================

//! ## Overview
//! Every append computes its hash over the previous entry's hash plus its own
//! canonical JSON, using [`acgs2_core::hashing::hash_chain_link`]. Integrity
//! verification walks the chain and fails closed on the first mismatch,
//! rather than reporting every break found.

use std::sync::Mutex;

use acgs2_core::hashing::hash_chain_link;
use acgs2_core::hashing::HashAlgorithm;
use acgs2_core::hashing::DEFAULT_HASH_ALGORITHM;
use acgs2_core::identifiers::AgentId;
use acgs2_core::identifiers::AuditEntryId;
use acgs2_core::UtcInstant;
use acgs2_core::CONSTITUTIONAL_HASH;
use serde_json::Value;

use crate::entry::AuditEntry;
use crate::entry::AuditEventType;
use crate::entry::ChainLinkPayload;
use crate::error::AuditError;

/// The `prev_hash` recorded on the ledger's first entry.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// An append-only, hash-chained log of governance events.
pub struct AuditLedger {
    entries: Mutex<Vec<AuditEntry>>,
    algorithm: HashAlgorithm,
}

impl AuditLedger {
    /// Creates an empty ledger using `algorithm` for chain links.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { entries: Mutex::new(Vec::new()), algorithm }
    }

    /// Appends a new entry, chaining it to the current tail hash.
    ///
    /// `outcome` is a short caller-supplied label for how the event
    /// resolved (e.g. `"allow"`, `"rejected"`, `"timed_out"`); the
    /// entry's `constitutional_hash` is always the one currently in force.
    ///
    /// # Errors
    /// Returns [`AuditError::Hashing`] if `detail` cannot be canonicalized.
    pub fn append(
        &self,
        id: AuditEntryId,
        event_type: AuditEventType,
        actor: AgentId,
        detail: Value,
        outcome: impl Into<String>,
        recorded_at: UtcInstant,
    ) -> Result<AuditEntry, AuditError> {
        let mut entries = self.locked_entries();
        let prev_hash = entries.last().map_or_else(|| GENESIS_HASH.to_owned(), |entry| entry.hash.clone());
        let outcome = outcome.into();
        let constitutional_hash = CONSTITUTIONAL_HASH.to_owned();

        let payload = ChainLinkPayload {
            id: &id,
            event_type,
            actor: &actor,
            recorded_at,
            detail: &detail,
            outcome: &outcome,
            constitutional_hash: &constitutional_hash,
        };
        let hash = hash_chain_link(self.algorithm, &prev_hash, &payload)?;

        let entry = AuditEntry {
            id,
            event_type,
            actor,
            recorded_at,
            detail,
            outcome,
            constitutional_hash,
            prev_hash,
            hash: hash.to_string(),
        };
        tracing::info!(
            entry_id = entry.id.as_str(),
            event_type = entry.event_type.as_str(),
            actor = entry.actor.as_str(),
            outcome = entry.outcome.as_str(),
            "appended audit ledger entry"
        );
        entries.push(entry.clone());
        Ok(entry)
    }

    /// Returns every entry, in append order.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.locked_entries().clone()
    }

    /// Returns entries of a given event type, in append order.
    #[must_use]
    pub fn by_type(&self, event_type: AuditEventType) -> Vec<AuditEntry> {
        self.locked_entries().iter().filter(|entry| entry.event_type == event_type).cloned().collect()
    }

    /// Returns entries attributed to a given actor, in append order.
    #[must_use]
    pub fn by_actor(&self, actor: &AgentId) -> Vec<AuditEntry> {
        self.locked_entries().iter().filter(|entry| &entry.actor == actor).cloned().collect()
    }

    /// Returns entries recorded within `[start, end]`, inclusive, in append order.
    #[must_use]
    pub fn by_time_range(&self, start: UtcInstant, end: UtcInstant) -> Vec<AuditEntry> {
        self.locked_entries()
            .iter()
            .filter(|entry| entry.recorded_at >= start && entry.recorded_at <= end)
            .cloned()
            .collect()
    }

    /// Recomputes every hash in the chain and confirms it matches what is
    /// stored, failing closed on the first break found.
    ///
    /// # Errors
    /// Returns [`AuditError::ChainBroken`] at the first entry whose stored
    /// hash does not match its recomputed value, or [`AuditError::Hashing`]
    /// if a stored entry can no longer be canonicalized.
    pub fn verify_integrity(&self) -> Result<(), AuditError> {
        let entries = self.locked_entries();
        let mut expected_prev = GENESIS_HASH.to_owned();

        for (index, entry) in entries.iter().enumerate() {
            if entry.prev_hash != expected_prev {
                return Err(AuditError::ChainBroken {
                    index,
                    expected: expected_prev,
                    actual: entry.prev_hash.clone(),
                });
            }

            let payload = ChainLinkPayload {
                id: &entry.id,
                event_type: entry.event_type,
                actor: &entry.actor,
                recorded_at: entry.recorded_at,
                detail: &entry.detail,
                outcome: &entry.outcome,
                constitutional_hash: &entry.constitutional_hash,
            };
            let recomputed = hash_chain_link(self.algorithm, &expected_prev, &payload)?.to_string();
            if recomputed != entry.hash {
                return Err(AuditError::ChainBroken { index, expected: recomputed, actual: entry.hash.clone() });
            }

            expected_prev = entry.hash.clone();
        }

        Ok(())
    }

    fn locked_entries(&self) -> std::sync::MutexGuard<'_, Vec<AuditEntry>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
