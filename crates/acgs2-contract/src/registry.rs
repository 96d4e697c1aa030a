// crates/acgs2-contract/src/registry.rs
// ============================================================================
// Module: OCI Registry Seam
// Description: Trait boundary for pushing/pulling signed bundle artifacts to
//              an OCI-compliant registry. No registry client lives here.
// ============================================================================

use async_trait::async_trait;

use crate::error::ContractError;

/// A content-addressed artifact as stored in an OCI registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OciArtifact {
    /// Registry reference, e.g. `registry.example.com/acgs2/bundles:latest`.
    pub reference: String,
    /// Raw artifact bytes (a signed bundle manifest, typically).
    pub payload: Vec<u8>,
    /// Media type of `payload`.
    pub media_type: String,
}

/// Pushes and pulls signed bundle artifacts to an OCI-compliant registry.
///
/// `acgs2-bundle` signs manifests; shipping them to a registry, and the KMS
/// that might back the signing key, is out of scope here (spec's registry-API
/// Non-goal) and left to a host-supplied implementation.
#[async_trait]
pub trait OciRegistryClient: Send + Sync {
    /// Uploads `artifact`, returning once the registry has acknowledged it.
    ///
    /// # Errors
    /// Returns [`ContractError`] if the registry is unreachable or rejects
    /// the artifact.
    async fn push(&self, artifact: &OciArtifact) -> Result<(), ContractError>;

    /// Downloads the artifact stored at `reference`.
    ///
    /// # Errors
    /// Returns [`ContractError::NotFound`] if no artifact exists at
    /// `reference`, or [`ContractError::Unavailable`] if the registry cannot
    /// be reached.
    async fn pull(&self, reference: &str) -> Result<OciArtifact, ContractError>;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// An in-memory registry, useful only for exercising [`OciRegistryClient`]
    /// callers in tests.
    #[derive(Debug, Default)]
    struct InMemoryOciRegistryClient {
        artifacts: Mutex<HashMap<String, OciArtifact>>,
    }

    #[async_trait]
    impl OciRegistryClient for InMemoryOciRegistryClient {
        async fn push(&self, artifact: &OciArtifact) -> Result<(), ContractError> {
            let mut artifacts = self.artifacts.lock().map_err(|_poison| {
                ContractError::Unavailable("in-memory registry lock poisoned".to_owned())
            })?;
            artifacts.insert(artifact.reference.clone(), artifact.clone());
            Ok(())
        }

        async fn pull(&self, reference: &str) -> Result<OciArtifact, ContractError> {
            let artifacts = self.artifacts.lock().map_err(|_poison| {
                ContractError::Unavailable("in-memory registry lock poisoned".to_owned())
            })?;
            artifacts
                .get(reference)
                .cloned()
                .ok_or_else(|| ContractError::NotFound(reference.to_owned()))
        }
    }

    #[tokio::test]
    async fn push_then_pull_round_trips_the_artifact() {
        let registry = InMemoryOciRegistryClient::default();
        let artifact = OciArtifact {
            reference: "registry.example.com/acgs2/bundles:v1".to_owned(),
            payload: vec![1, 2, 3],
            media_type: "application/vnd.acgs2.bundle+json".to_owned(),
        };
        registry.push(&artifact).await.expect("push must succeed");
        let fetched = registry.pull(&artifact.reference).await.expect("pull must succeed");
        assert_eq!(fetched, artifact);
    }

    #[tokio::test]
    async fn pull_of_unknown_reference_is_not_found() {
        let registry = InMemoryOciRegistryClient::default();
        let err = registry.pull("registry.example.com/acgs2/bundles:missing").await.expect_err("expected not-found");
        assert!(matches!(err, ContractError::NotFound(_)));
    }
}
