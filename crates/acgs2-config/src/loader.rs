// crates/acgs2-config/src/loader.rs
// ============================================================================
// Module: Config Loader
// Description: Layers default -> file -> environment overrides into a
//              validated GovernanceConfig, with fail-closed input guards.
// ============================================================================

use std::fs;
use std::path::Path;

use crate::config::GovernanceConfig;
use crate::error::ConfigError;

/// Maximum accepted length of a config path, in bytes.
pub const MAX_PATH_LEN: usize = 4_096;

/// Maximum accepted length of a single path component, in bytes.
pub const MAX_PATH_COMPONENT_LEN: usize = 255;

/// Maximum accepted config file size, in bytes.
pub const MAX_FILE_SIZE: u64 = 1_048_576;

/// Environment variable holding the path to a config file, consulted when
/// [`load`] is called with `None`.
pub const CONFIG_PATH_ENV: &str = "ACGS2_CONFIG";

/// Environment variable overriding `router.impact_threshold`.
pub const IMPACT_THRESHOLD_ENV: &str = "ACGS2_IMPACT_THRESHOLD";

/// Environment variable overriding `deliberation.consensus_threshold`.
pub const CONSENSUS_THRESHOLD_ENV: &str = "ACGS2_CONSENSUS_THRESHOLD";

/// Environment variable overriding `profile` (`production` or `test`).
pub const PROFILE_ENV: &str = "ACGS2_PROFILE";

fn guard_path(path: &Path) -> Result<(), ConfigError> {
    let path_str = path.as_os_str().to_string_lossy();
    if path_str.len() > MAX_PATH_LEN {
        return Err(ConfigError::PathTooLong);
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LEN {
            return Err(ConfigError::PathComponentTooLong);
        }
    }
    Ok(())
}

fn read_guarded(path: &Path) -> Result<String, ConfigError> {
    guard_path(path)?;
    let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(ConfigError::TooLarge);
    }
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    String::from_utf8(bytes).map_err(|_utf8_error| ConfigError::NotUtf8)
}

fn apply_env_overrides(mut config: GovernanceConfig) -> Result<GovernanceConfig, ConfigError> {
    if let Ok(raw) = std::env::var(IMPACT_THRESHOLD_ENV) {
        config.router.impact_threshold = raw.parse().map_err(|_parse_error| ConfigError::EnvOverride {
            var: IMPACT_THRESHOLD_ENV,
            reason: format!("{raw} is not a valid f64"),
        })?;
    }
    if let Ok(raw) = std::env::var(CONSENSUS_THRESHOLD_ENV) {
        config.deliberation.consensus_threshold =
            raw.parse().map_err(|_parse_error| ConfigError::EnvOverride {
                var: CONSENSUS_THRESHOLD_ENV,
                reason: format!("{raw} is not a valid f64"),
            })?;
    }
    if let Ok(raw) = std::env::var(PROFILE_ENV) {
        config.profile = match raw.as_str() {
            "production" => crate::config::Profile::Production,
            "test" => crate::config::Profile::Test,
            other => {
                return Err(ConfigError::EnvOverride {
                    var: PROFILE_ENV,
                    reason: format!("{other} is neither \"production\" nor \"test\""),
                });
            }
        };
    }
    Ok(config)
}

/// Loads a [`GovernanceConfig`] layered from defaults, an optional TOML file,
/// and environment overrides, then validates the result.
///
/// `path` takes precedence over [`CONFIG_PATH_ENV`]; if neither is set, the
/// defaults (plus any environment overrides) are used directly.
///
/// # Errors
/// Returns [`ConfigError`] if the path fails a fail-closed guard, the file
/// cannot be read or parsed, an environment override is malformed, or the
/// resulting config fails [`GovernanceConfig::validate`].
pub fn load(path: Option<&Path>) -> Result<GovernanceConfig, ConfigError> {
    let resolved_path = path.map(Path::to_path_buf).or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(Into::into));

    let config = if let Some(path) = resolved_path.as_deref() {
        let contents = read_guarded(path)?;
        toml::from_str::<GovernanceConfig>(&contents).map_err(|err| ConfigError::Parse(err.to_string()))?
    } else {
        GovernanceConfig::default()
    };

    let config = apply_env_overrides(config)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn load_with_no_path_returns_defaults() {
        let config = load(None).expect("defaults must validate");
        assert_eq!(config, GovernanceConfig::default());
    }

    #[test]
    fn load_rejects_path_too_long() {
        let long_path = "a".repeat(5_000);
        let path = Path::new(&long_path);
        let err = load(Some(path)).expect_err("expected path-too-long error");
        assert!(err.to_string().contains("config path exceeds max length"));
    }

    #[test]
    fn load_rejects_path_component_too_long() {
        let long_component = "a".repeat(300);
        let path = Path::new(&long_component);
        let err = load(Some(path)).expect_err("expected path-component error");
        assert!(err.to_string().contains("config path component too long"));
    }

    #[test]
    fn load_rejects_oversized_file() {
        let mut file = NamedTempFile::new().expect("create temp file");
        let payload = vec![b'a'; 1_048_577];
        file.write_all(&payload).expect("write payload");
        let err = load(Some(file.path())).expect_err("expected size-limit error");
        assert!(err.to_string().contains("config file exceeds size limit"));
    }

    #[test]
    fn load_rejects_non_utf8_file() {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(&[0xFF, 0xFE, 0xFF]).expect("write bytes");
        let err = load(Some(file.path())).expect_err("expected utf8 error");
        assert!(err.to_string().contains("config file must be utf-8"));
    }

    #[test]
    fn load_parses_a_partial_toml_file_over_defaults() {
        let mut file = NamedTempFile::new().expect("create temp file");
        writeln!(file, "[deliberation]\nrequired_votes = 5\nconsensus_threshold = 0.75").expect("write toml");
        let config = load(Some(file.path())).expect("partial file must load");
        assert_eq!(config.deliberation.required_votes, 5);
        assert!((config.deliberation.consensus_threshold - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.router, GovernanceConfig::default().router);
    }

    #[test]
    fn load_rejects_a_file_that_fails_validation() {
        let mut file = NamedTempFile::new().expect("create temp file");
        writeln!(file, "[router]\nimpact_threshold = 2.0\ndeliberation_timeout_secs = 300\nenable_learning = true")
            .expect("write toml");
        let err = load(Some(file.path())).expect_err("expected validation failure");
        assert!(err.to_string().contains("impact_threshold"));
    }
}
