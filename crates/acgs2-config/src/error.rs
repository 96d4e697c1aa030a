// crates/acgs2-config/src/error.rs
// ============================================================================
// Module: Config Errors
// Description: Fail-closed load and validation failures for GovernanceConfig.
// ============================================================================

use thiserror::Error;

/// Failure modes of loading or validating a [`crate::GovernanceConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config path's total length exceeds [`crate::loader::MAX_PATH_LEN`].
    #[error("config path exceeds max length")]
    PathTooLong,

    /// One path component exceeds [`crate::loader::MAX_PATH_COMPONENT_LEN`].
    #[error("config path component too long")]
    PathComponentTooLong,

    /// The config file could not be opened or read.
    #[error("config file io error: {0}")]
    Io(String),

    /// The config file exceeds [`crate::loader::MAX_FILE_SIZE`].
    #[error("config file exceeds size limit")]
    TooLarge,

    /// The config file is not valid UTF-8.
    #[error("config file must be utf-8")]
    NotUtf8,

    /// The TOML document could not be parsed into a [`crate::GovernanceConfig`].
    #[error("config parse error: {0}")]
    Parse(String),

    /// An environment override's value could not be parsed for its field's type.
    #[error("config env override {var} invalid: {reason}")]
    EnvOverride {
        /// The environment variable that held the bad value.
        var: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The loaded config failed a validation rule.
    #[error("config validation failed: {0}")]
    Invalid(String),
}
