// crates/acgs2-config/src/lib.rs
// ============================================================================
// Crate: acgs2-config
// Description: Canonical configuration model for a governance host: layered
//              TOML loading, environment overrides, and validation.
// ============================================================================

//! ## Overview
//! [`GovernanceConfig`] is the one tunable surface every composition root
//! builds its router, scorer, deliberation queue, saga engine and verifier
//! from. [`load`] layers an optional TOML file and environment overrides on
//! top of built-in defaults, then validates the result.

pub mod config;
pub mod error;
pub mod loader;

pub use config::DeliberationConfig;
pub use config::GovernanceConfig;
pub use config::PersistenceBackend;
pub use config::Profile;
pub use config::SagaConfig;
pub use config::VerifierConfig;
pub use error::ConfigError;
pub use loader::load;
pub use loader::CONFIG_PATH_ENV;
pub use loader::CONSENSUS_THRESHOLD_ENV;
pub use loader::IMPACT_THRESHOLD_ENV;
pub use loader::MAX_FILE_SIZE;
pub use loader::MAX_PATH_COMPONENT_LEN;
pub use loader::MAX_PATH_LEN;
pub use loader::PROFILE_ENV;
