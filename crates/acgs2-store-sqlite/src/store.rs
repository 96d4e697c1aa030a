// crates/acgs2-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Saga Store
// Description: Durable SagaStore backed by SQLite, one row per saga holding
//              a canonical JSON snapshot plus its content hash.
// Dependencies: acgs2-core (hashing), acgs2-saga, rusqlite
// ============================================================================

//! ## Overview
//! Every [`SagaStore::save`] rewrites the full document for a saga in a
//! single statement; [`SagaStore::load`] re-verifies the stored hash before
//! parsing, so a corrupted or partially-written row is reported as
//! [`SqliteStoreError::Corrupt`] rather than silently returned as valid
//! state. All `SQLite` access runs on a blocking task, since `rusqlite`
//! connections are not `Send`-safe across `.await` points.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use acgs2_core::hashing::DEFAULT_HASH_ALGORITHM;
use acgs2_core::hashing::HashAlgorithm;
use acgs2_core::hashing::canonical_json_bytes;
use acgs2_core::hashing::hash_bytes;
use acgs2_core::identifiers::SagaId;
use acgs2_saga::SagaState;
use acgs2_saga::SagaStore;
use acgs2_saga::SagaStoreError;
use async_trait::async_trait;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::error::SqliteStoreError;

/// `SQLite` journal mode for a [`SqliteStoreConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteJournalMode {
    /// WAL mode: concurrent readers alongside a single writer.
    Wal,
    /// Rollback-journal delete mode.
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value for this mode.
    #[must_use]
    const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// Configuration for [`SqliteSagaStore::open`].
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds before a locked-database call errors out.
    pub busy_timeout_ms: u64,
    /// Journal mode, `Wal` by default.
    pub journal_mode: SqliteJournalMode,
}

impl SqliteStoreConfig {
    /// Builds a config pointed at `path` with WAL mode and a 5s busy timeout.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout_ms: 5_000, journal_mode: SqliteJournalMode::Wal }
    }
}

/// `SQLite`-backed [`SagaStore`].
///
/// Durable alternative to [`acgs2_saga::FileSagaStore`] for hosts that prefer
/// a single database file over one document per saga.
#[derive(Clone)]
pub struct SqliteSagaStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteSagaStore {
    /// Opens (creating if necessary) a `SQLite`-backed saga store.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Io`] if the database file or its parent
    /// directory cannot be created, and [`SqliteStoreError::Db`] if the
    /// schema cannot be initialized.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        ensure_parent_dir(&config.path)?;
        let connection = Connection::open(&config.path).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        connection
            .pragma_update(None, "journal_mode", config.journal_mode.pragma_value())
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        connection
            .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        initialize_schema(&connection)?;
        tracing::info!(path = %config.path.display(), "opened sqlite saga store");
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }
}

#[async_trait]
impl SagaStore for SqliteSagaStore {
    async fn load(&self, saga_id: &SagaId) -> Result<Option<SagaState>, SagaStoreError> {
        let connection = Arc::clone(&self.connection);
        let saga_id = saga_id.as_str().to_owned();
        run_blocking(move || load_blocking(&connection, &saga_id)).await.map_err(SagaStoreError::from)
    }

    async fn save(&self, state: &SagaState) -> Result<(), SagaStoreError> {
        let connection = Arc::clone(&self.connection);
        let state = state.clone();
        run_blocking(move || save_blocking(&connection, &state)).await.map_err(SagaStoreError::from)
    }

    async fn delete(&self, saga_id: &SagaId) -> Result<(), SagaStoreError> {
        let connection = Arc::clone(&self.connection);
        let saga_id = saga_id.as_str().to_owned();
        run_blocking(move || delete_blocking(&connection, &saga_id)).await.map_err(SagaStoreError::from)
    }
}

/// Runs `task` on a blocking thread, translating a join failure into
/// [`SqliteStoreError::Task`].
async fn run_blocking<T, F>(task: F) -> Result<T, SqliteStoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SqliteStoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|err| SqliteStoreError::Task(err.to_string()))?
}

/// Creates the `sagas` table if it does not already exist.
fn initialize_schema(connection: &Connection) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS sagas (
                saga_id TEXT PRIMARY KEY,
                state_json BLOB NOT NULL,
                state_hash TEXT NOT NULL,
                hash_algorithm TEXT NOT NULL
            );",
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

/// Loads and integrity-checks a saga's stored document.
fn load_blocking(connection: &Mutex<Connection>, saga_id: &str) -> Result<Option<SagaState>, SqliteStoreError> {
    let guard = connection.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let row: Option<(Vec<u8>, String, String)> = guard
        .query_row(
            "SELECT state_json, state_hash, hash_algorithm FROM sagas WHERE saga_id = ?1",
            params![saga_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    drop(guard);

    let Some((bytes, stored_hash, algorithm_label)) = row else { return Ok(None) };
    if algorithm_label != algorithm_label_for(DEFAULT_HASH_ALGORITHM) {
        return Err(SqliteStoreError::Corrupt {
            saga_id: saga_id.to_owned(),
            reason: format!("unsupported hash algorithm {algorithm_label}"),
        });
    }
    let recomputed = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes);
    if recomputed.value != stored_hash {
        return Err(SqliteStoreError::Corrupt {
            saga_id: saga_id.to_owned(),
            reason: "stored hash does not match document bytes".to_owned(),
        });
    }
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| SqliteStoreError::Corrupt { saga_id: saga_id.to_owned(), reason: err.to_string() })
}

/// Writes `state`'s canonical document, replacing any prior row.
fn save_blocking(connection: &Mutex<Connection>, state: &SagaState) -> Result<(), SqliteStoreError> {
    let bytes = canonical_json_bytes(state).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes);
    let saga_id = state.saga_id.as_str();
    let guard = connection.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    guard
        .execute(
            "INSERT INTO sagas (saga_id, state_json, state_hash, hash_algorithm)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(saga_id) DO UPDATE SET
                state_json = excluded.state_json,
                state_hash = excluded.state_hash,
                hash_algorithm = excluded.hash_algorithm",
            params![saga_id, bytes, digest.value, algorithm_label_for(digest.algorithm)],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tracing::info!(saga_id, status = state.status.as_str(), "persisted saga state to sqlite");
    Ok(())
}

/// Removes a saga's stored document, if any.
fn delete_blocking(connection: &Mutex<Connection>, saga_id: &str) -> Result<(), SqliteStoreError> {
    let guard = connection.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    guard
        .execute("DELETE FROM sagas WHERE saga_id = ?1", params![saga_id])
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Creates `path`'s parent directory if it does not already exist.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
    }
    Ok(())
}

/// Returns the wire label stored for a [`HashAlgorithm`].
const fn algorithm_label_for(algorithm: HashAlgorithm) -> &'static str {
    match algorithm {
        HashAlgorithm::Sha256 => "sha256",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use std::collections::HashMap;

    use acgs2_core::identifiers::StepName;
    use acgs2_saga::SagaContext;

    use super::*;

    fn sample_state(saga_id: &str) -> SagaState {
        SagaState::new(SagaId::from(saga_id), SagaContext::new(SagaId::from(saga_id), HashMap::new()))
    }

    #[tokio::test]
    async fn round_trips_state_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteSagaStore::open(&SqliteStoreConfig::new(dir.path().join("sagas.db"))).expect("open");
        let state = sample_state("s1");
        store.save(&state).await.expect("save");

        let loaded = store.load(&SagaId::from("s1")).await.expect("load").expect("present");
        assert_eq!(loaded.saga_id, state.saga_id);
        assert_eq!(loaded.status, state.status);
    }

    #[tokio::test]
    async fn load_of_unknown_saga_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteSagaStore::open(&SqliteStoreConfig::new(dir.path().join("sagas.db"))).expect("open");
        let loaded = store.load(&SagaId::from("missing")).await.expect("load");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn save_overwrites_a_prior_document_for_the_same_saga() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteSagaStore::open(&SqliteStoreConfig::new(dir.path().join("sagas.db"))).expect("open");
        store.save(&sample_state("s1")).await.expect("save 1");

        let mut second = sample_state("s1");
        second.completed_steps.push(StepName::from("step-a"));
        store.save(&second).await.expect("save 2");

        let loaded = store.load(&SagaId::from("s1")).await.expect("load").expect("present");
        assert_eq!(loaded.completed_steps.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_the_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteSagaStore::open(&SqliteStoreConfig::new(dir.path().join("sagas.db"))).expect("open");
        store.save(&sample_state("to-delete")).await.expect("save");
        store.delete(&SagaId::from("to-delete")).await.expect("delete");
        let loaded = store.load(&SagaId::from("to-delete")).await.expect("load");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn delete_of_unknown_saga_does_not_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteSagaStore::open(&SqliteStoreConfig::new(dir.path().join("sagas.db"))).expect("open");
        store.delete(&SagaId::from("nonexistent")).await.expect("delete");
    }
}
