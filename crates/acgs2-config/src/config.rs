// crates/acgs2-config/src/config.rs
// ============================================================================
// Module: Governance Config Model
// Description: The validated, layered configuration for a governance host:
//              router, scoring, deliberation, saga, verifier and persistence
//              tunables, plus the production/test profile switch.
// ============================================================================

use acgs2_impact_scorer::ScoringConfig;
use acgs2_router::RouterConfig;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

/// Consensus tunables for the deliberation queue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliberationConfig {
    /// Minimum number of votes required before consensus can be evaluated.
    pub required_votes: usize,
    /// Fraction of approvals over total votes needed to reach consensus. When
    /// a caller supplies per-agent weights for a given item, this same
    /// fraction is evaluated against weighted sums instead of raw counts.
    pub consensus_threshold: f64,
}

impl Default for DeliberationConfig {
    fn default() -> Self {
        Self { required_votes: 3, consensus_threshold: 0.6 }
    }
}

/// Retry and timeout tunables applied to saga steps that don't set their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SagaConfig {
    /// Default per-step timeout, in seconds.
    pub step_timeout_secs: u64,
    /// Default number of retry attempts before a step fails.
    pub max_retries: u32,
    /// Default delay between retry attempts, in seconds.
    pub retry_delay_secs: f64,
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self { step_timeout_secs: 30, max_retries: 3, retry_delay_secs: 1.0 }
    }
}

/// Tunables for the formal policy verifier (SMT + optional Dafny).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Wall-clock budget for a single verifier invocation, in seconds.
    pub timeout_secs: u64,
    /// Maximum number of counterexample-guided regeneration iterations.
    pub max_iterations: u32,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self { timeout_secs: 30, max_iterations: 5 }
    }
}

/// Which durable backend a saga engine persists its state to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceBackend {
    /// No durability; state is lost on process restart. Test profile only.
    Memory,
    /// One JSON file per saga, written atomically.
    File,
    /// A single `SQLite` database in WAL mode.
    Sqlite,
}

impl Default for PersistenceBackend {
    fn default() -> Self {
        Self::File
    }
}

/// Which operating posture this config was built for.
///
/// `Production` disallows the insecure defaults (in-memory persistence,
/// stub secrets stores) that are acceptable for local exercising and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Deployed posture: durable persistence, no insecure fallbacks reachable.
    Production,
    /// Local/CI posture: in-memory persistence and stub collaborators allowed.
    Test,
}

impl Default for Profile {
    fn default() -> Self {
        Self::Test
    }
}

/// The full, validated tunable surface for a governance host.
///
/// Every field has a sensible default; a host overrides only what it needs
/// via a TOML file and environment variables, layered defaults-then-file-then-env.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Message routing tunables (impact threshold, deliberation timeout).
    pub router: RouterConfig,
    /// Impact-scoring signal weights.
    pub scoring: ScoringConfig,
    /// Deliberation queue consensus tunables.
    pub deliberation: DeliberationConfig,
    /// Saga retry/timeout tunables.
    pub saga: SagaConfig,
    /// Formal verifier tunables.
    pub verifier: VerifierConfig,
    /// Saga state persistence backend.
    pub persistence: PersistenceBackend,
    /// Operating posture.
    pub profile: Profile,
    /// Whether an unsafe `audit_reasoning` verdict aborts a non-optional saga
    /// step instead of only being recorded on the saga context.
    pub abort_on_unsafe_reasoning: bool,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            scoring: ScoringConfig::default(),
            deliberation: DeliberationConfig::default(),
            saga: SagaConfig::default(),
            verifier: VerifierConfig::default(),
            persistence: PersistenceBackend::default(),
            profile: Profile::default(),
            abort_on_unsafe_reasoning: false,
        }
    }
}

impl GovernanceConfig {
    /// Checks every numeric bound and cross-field rule. Called by [`crate::loader::load`]
    /// after layering, and should also be called by a host that builds a
    /// config programmatically instead of loading one.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first rule that failed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.router.impact_threshold) {
            return Err(ConfigError::Invalid("router.impact_threshold must be in [0, 1]".to_owned()));
        }
        if self.router.deliberation_timeout_secs == 0 {
            return Err(ConfigError::Invalid("router.deliberation_timeout_secs must be > 0".to_owned()));
        }
        let weight_total = self.scoring.total_weight();
        if (weight_total - 1.0).abs() > 0.01 {
            return Err(ConfigError::Invalid(format!(
                "scoring weights must sum to 1.0, got {weight_total}"
            )));
        }
        if self.deliberation.required_votes == 0 {
            return Err(ConfigError::Invalid("deliberation.required_votes must be > 0".to_owned()));
        }
        if !(0.0..=1.0).contains(&self.deliberation.consensus_threshold) {
            return Err(ConfigError::Invalid("deliberation.consensus_threshold must be in [0, 1]".to_owned()));
        }
        if self.saga.step_timeout_secs == 0 {
            return Err(ConfigError::Invalid("saga.step_timeout_secs must be > 0".to_owned()));
        }
        if self.saga.retry_delay_secs < 0.0 {
            return Err(ConfigError::Invalid("saga.retry_delay_secs must be >= 0".to_owned()));
        }
        if self.verifier.timeout_secs == 0 {
            return Err(ConfigError::Invalid("verifier.timeout_secs must be > 0".to_owned()));
        }
        if self.verifier.max_iterations == 0 {
            return Err(ConfigError::Invalid("verifier.max_iterations must be > 0".to_owned()));
        }
        if self.profile == Profile::Production && self.persistence == PersistenceBackend::Memory {
            return Err(ConfigError::Invalid(
                "profile = production requires a durable persistence backend, got memory".to_owned(),
            ));
        }
        Ok(())
    }
}
