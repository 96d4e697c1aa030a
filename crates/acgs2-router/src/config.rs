// crates/acgs2-router/src/config.rs
// ============================================================================
// Module: Router Configuration
// Description: Tunables for the C2 adaptive router.
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// Configuration for [`crate::router::AdaptiveRouter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Impact score at or above which a message is routed to deliberation.
    pub impact_threshold: f64,
    /// Deliberation deadline, in seconds, attached to deliberation-bound routes.
    pub deliberation_timeout_secs: u64,
    /// Whether the router adapts `impact_threshold` from outcome feedback.
    pub enable_learning: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            impact_threshold: 0.8,
            deliberation_timeout_secs: 300,
            enable_learning: true,
        }
    }
}
