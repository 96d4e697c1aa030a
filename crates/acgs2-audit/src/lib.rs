// crates/acgs2-audit/src/lib.rs
// ============================================================================
// Crate: acgs2-audit
// Description: C7 — append-only, hash-chained audit ledger for governance
//              events raised by every other component.
// ============================================================================

//! ## Overview
//! Every component in the governance core (routing, deliberation, sagas,
//! policy decisions, bundle signing) records its significant events here.
//! Entries chain by hash so that altering or removing a past entry is
//! detectable by [`ledger::AuditLedger::verify_integrity`].

pub mod entry;
pub mod error;
pub mod ledger;

pub use entry::AuditEntry;
pub use entry::AuditEventType;
pub use error::AuditError;
pub use ledger::AuditLedger;
pub use ledger::GENESIS_HASH;
