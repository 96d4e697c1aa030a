// crates/acgs2-store-sqlite/src/error.rs
// ============================================================================
// Module: SQLite Store Errors
// ============================================================================

use acgs2_saga::SagaStoreError;
use thiserror::Error;

/// Failure modes of the `SQLite`-backed saga store.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// The database file or its parent directory could not be opened or created.
    #[error("sqlite store io error: {0}")]
    Io(String),

    /// The underlying `SQLite` engine reported an error.
    #[error("sqlite store db error: {0}")]
    Db(String),

    /// A stored document's hash did not match its recomputed value, or its
    /// JSON could not be parsed.
    #[error("sqlite store corrupt for saga {saga_id}: {reason}")]
    Corrupt {
        /// The saga whose stored document failed verification.
        saga_id: String,
        /// Why the document was rejected.
        reason: String,
    },

    /// The background blocking task the query ran on panicked or was cancelled.
    #[error("sqlite store task failed: {0}")]
    Task(String),
}

impl From<SqliteStoreError> for SagaStoreError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Corrupt { saga_id, reason } => Self::Corrupt { saga_id, reason },
            other => Self::Io(other.to_string()),
        }
    }
}
