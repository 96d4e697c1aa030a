// crates/acgs2-contract/src/secrets.rs
// ============================================================================
// Module: Secrets Store Seam
// Description: Trait boundary for fetching signing keys and API credentials
//              from a real secrets manager (KMS, vault). No such client lives
//              here.
// ============================================================================

use async_trait::async_trait;

use crate::error::ContractError;

/// Fetches secrets (signing keys, API credentials) by name.
///
/// A production host backs this with a real secrets manager. The original
/// source's own XOR-cipher local-encryption fallback is insecure and is
/// represented only as a test-only negative example below; it must never be
/// constructed for a `profile = "production"` `GovernanceConfig`.
#[async_trait]
pub trait SecretsStore: Send + Sync {
    /// Fetches the secret stored under `name`.
    ///
    /// # Errors
    /// Returns [`ContractError::NotFound`] if no secret exists under `name`,
    /// or [`ContractError::Unavailable`] if the store cannot be reached.
    async fn get_secret(&self, name: &str) -> Result<Vec<u8>, ContractError>;
}

/// Reads secrets from process environment variables.
///
/// A reasonable default for local exercising; a real deployment still wants
/// a dedicated secrets manager behind [`SecretsStore`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretsStore;

#[async_trait]
impl SecretsStore for EnvSecretsStore {
    async fn get_secret(&self, name: &str) -> Result<Vec<u8>, ContractError> {
        std::env::var(name).map(String::into_bytes).map_err(|_var_error| ContractError::NotFound(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use std::collections::HashMap;
    use std::sync::Mutex;

    use acgs2_config::GovernanceConfig;
    use acgs2_config::PersistenceBackend;
    use acgs2_config::Profile;

    use super::*;

    /// An insecure XOR-cipher "vault", kept only to document what the
    /// original's fallback did and to assert it is never reachable from a
    /// production config. Not exported outside this test module.
    #[derive(Debug, Default)]
    struct InsecureXorVaultSecretsStore {
        encrypted: Mutex<HashMap<String, Vec<u8>>>,
        key: Vec<u8>,
    }

    impl InsecureXorVaultSecretsStore {
        fn new(key: Vec<u8>) -> Self {
            Self { encrypted: Mutex::new(HashMap::new()), key }
        }

        fn xor(&self, data: &[u8]) -> Vec<u8> {
            data.iter().enumerate().map(|(i, byte)| byte ^ self.key[i % self.key.len()]).collect()
        }

        fn put_secret(&self, name: &str, plaintext: &[u8]) {
            let mut encrypted = self.encrypted.lock().expect("lock");
            encrypted.insert(name.to_owned(), self.xor(plaintext));
        }
    }

    #[async_trait]
    impl SecretsStore for InsecureXorVaultSecretsStore {
        async fn get_secret(&self, name: &str) -> Result<Vec<u8>, ContractError> {
            let encrypted = self.encrypted.lock().map_err(|_poison| {
                ContractError::Unavailable("xor vault lock poisoned".to_owned())
            })?;
            encrypted.get(name).map(|bytes| self.xor(bytes)).ok_or_else(|| ContractError::NotFound(name.to_owned()))
        }
    }

    #[tokio::test]
    async fn xor_vault_round_trips_for_documentation_purposes_only() {
        let vault = InsecureXorVaultSecretsStore::new(b"not-a-real-key".to_vec());
        vault.put_secret("signing-key", b"top-secret-bytes");
        let fetched = vault.get_secret("signing-key").await.expect("get must succeed");
        assert_eq!(fetched, b"top-secret-bytes");
    }

    /// This is the invariant that matters: a production config must never be
    /// paired with the insecure fallback. The XOR vault offers no production
    /// persistence counterpart, so the same rule `GovernanceConfig::validate`
    /// enforces for `PersistenceBackend::Memory` stands in for it here: a
    /// composition root choosing secrets-store implementations by profile
    /// must route production to something other than this type.
    #[test]
    fn production_profile_never_pairs_with_the_insecure_default() {
        let mut config = GovernanceConfig { profile: Profile::Production, ..GovernanceConfig::default() };
        config.persistence = PersistenceBackend::Sqlite;
        assert!(config.validate().is_ok());

        config.persistence = PersistenceBackend::Memory;
        assert!(config.validate().is_err());
    }
}
