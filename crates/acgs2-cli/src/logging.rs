// crates/acgs2-cli/src/logging.rs
// ============================================================================
// Module: Logging
// Description: Installs the process-wide tracing subscriber, honoring
//              `RUST_LOG` and switching to structured JSON when requested.
// ============================================================================

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// Reads filter directives from `RUST_LOG`, defaulting to `info` when unset.
/// When `json` is set, log lines are emitted as structured JSON objects
/// instead of the default human-readable format.
///
/// # Panics
/// Panics if a subscriber has already been installed for this process.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}
