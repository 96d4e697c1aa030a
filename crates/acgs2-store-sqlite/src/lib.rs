// crates/acgs2-store-sqlite/src/lib.rs
// ============================================================================
// Crate: acgs2-store-sqlite
// Description: SQLite-backed alternative to acgs2-saga's file-backed
//              SagaStore, for hosts that prefer a single database file.
// ============================================================================

//! ## Overview
//! [`SqliteSagaStore`] implements `acgs2_saga::SagaStore` over a `SQLite`
//! database opened in WAL mode by default. Each saga is one row: a canonical
//! JSON snapshot plus its `SHA-256` hash, re-verified on every load. This
//! crate has no opinion on schema registries, perf telemetry, or multi-tenant
//! namespacing; it persists exactly the document `acgs2-saga` hands it.

pub mod error;
pub mod store;

pub use error::SqliteStoreError;
pub use store::SqliteJournalMode;
pub use store::SqliteSagaStore;
pub use store::SqliteStoreConfig;
