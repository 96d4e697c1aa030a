// crates/acgs2-saga/src/store.rs
// ============================================================================
// Module: Saga Persistence
// Description: The trait seam saga state is persisted through, plus an
//              in-memory and a file-backed implementation.
// ============================================================================

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use acgs2_core::identifiers::SagaId;
use async_trait::async_trait;

use crate::error::SagaStoreError;
use crate::state::SagaState;

/// Durable storage for [`SagaState`], addressed by `saga_id`.
///
/// Implementations persist the full state document on every call; the
/// orchestrator treats whatever `load` returns as the single source of truth
/// on resume.
#[async_trait]
pub trait SagaStore: Send + Sync {
    /// Loads the persisted state for `saga_id`, or `None` if it has never
    /// been saved (or has been deleted).
    ///
    /// # Errors
    /// Returns [`SagaStoreError::Corrupt`] if a document exists but cannot be
    /// parsed, treated as a crashed writer rather than a missing saga.
    async fn load(&self, saga_id: &SagaId) -> Result<Option<SagaState>, SagaStoreError>;

    /// Persists `state`, replacing any prior document for the same saga.
    ///
    /// # Errors
    /// Returns [`SagaStoreError::Io`] on a write failure.
    async fn save(&self, state: &SagaState) -> Result<(), SagaStoreError>;

    /// Removes the persisted document for `saga_id`, if any.
    ///
    /// # Errors
    /// Returns [`SagaStoreError::Io`] on a removal failure other than
    /// the document not existing.
    async fn delete(&self, saga_id: &SagaId) -> Result<(), SagaStoreError>;
}

/// Process-local, non-durable [`SagaStore`] backed by a locked hash map.
///
/// Suitable for tests and for hosts that accept losing in-flight sagas on
/// crash.
#[derive(Debug, Default)]
pub struct InMemorySagaStore {
    states: Mutex<HashMap<String, SagaState>>,
}

impl InMemorySagaStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SagaStore for InMemorySagaStore {
    async fn load(&self, saga_id: &SagaId) -> Result<Option<SagaState>, SagaStoreError> {
        let states = self.states.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(states.get(saga_id.as_str()).cloned())
    }

    async fn save(&self, state: &SagaState) -> Result<(), SagaStoreError> {
        let mut states = self.states.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        states.insert(state.saga_id.as_str().to_owned(), state.clone());
        Ok(())
    }

    async fn delete(&self, saga_id: &SagaId) -> Result<(), SagaStoreError> {
        let mut states = self.states.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        states.remove(saga_id.as_str());
        Ok(())
    }
}

/// File-backed [`SagaStore`]: one canonical-JSON document per saga, written
/// via write-to-temp-then-rename so a crash mid-write never leaves a
/// partially-written document at the final path.
#[derive(Debug)]
pub struct FileSagaStore {
    base_path: PathBuf,
}

impl FileSagaStore {
    /// Opens (creating if necessary) a file-backed store rooted at `base_path`.
    ///
    /// # Errors
    /// Returns [`SagaStoreError::Io`] if `base_path` cannot be created.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, SagaStoreError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path).map_err(|err| SagaStoreError::Io(err.to_string()))?;
        Ok(Self { base_path })
    }

    /// Returns the path a saga's document is stored at.
    fn path_for(&self, saga_id: &SagaId) -> PathBuf {
        self.base_path.join(format!("{}.json", saga_id.as_str()))
    }
}

#[async_trait]
impl SagaStore for FileSagaStore {
    async fn load(&self, saga_id: &SagaId) -> Result<Option<SagaState>, SagaStoreError> {
        let path = self.path_for(saga_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SagaStoreError::Io(err.to_string())),
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|err| SagaStoreError::Corrupt {
            saga_id: saga_id.as_str().to_owned(),
            reason: err.to_string(),
        })
    }

    async fn save(&self, state: &SagaState) -> Result<(), SagaStoreError> {
        let path = self.path_for(&state.saga_id);
        let bytes = acgs2_core::hashing::canonical_json_bytes(state)
            .map_err(|err| SagaStoreError::Io(err.to_string()))?;
        let tmp_path = tmp_path_for(&path);
        tokio::fs::write(&tmp_path, &bytes).await.map_err(|err| SagaStoreError::Io(err.to_string()))?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|err| SagaStoreError::Io(err.to_string()))
    }

    async fn delete(&self, saga_id: &SagaId) -> Result<(), SagaStoreError> {
        let path = self.path_for(saga_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SagaStoreError::Io(err.to_string())),
        }
    }
}

/// Builds the temporary path a document is written to before the atomic
/// rename into place.
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
