// crates/acgs2-cli/src/error.rs
// ============================================================================
// Module: CLI Errors
// Description: Wraps every core crate's error type into one enum so `main`
//              has a single `Result` to report and exit on.
// ============================================================================

use thiserror::Error;

/// Top-level failure mode of any `acgs2` subcommand.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or validating the effective configuration failed.
    #[error(transparent)]
    Config(#[from] acgs2_config::ConfigError),

    /// Building, signing, or verifying a bundle manifest failed.
    #[error(transparent)]
    Bundle(#[from] acgs2_bundle::BundleError),

    /// The Propose-Solve-Verify loop failed.
    #[error(transparent)]
    PolicyGen(#[from] acgs2_policy_gen::PolicyGenError),

    /// The govern pipeline failed.
    #[error("govern pipeline failed: {0}")]
    Pipeline(String),

    /// Reading a request or manifest file from disk failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A request or manifest file was not valid JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rendering the effective configuration as TOML failed.
    #[error("toml error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl From<Box<dyn std::error::Error>> for CliError {
    fn from(err: Box<dyn std::error::Error>) -> Self {
        Self::Pipeline(err.to_string())
    }
}
