// crates/acgs2-impact-scorer/src/config.rs
// ============================================================================
// Module: Impact Scoring Configuration
// Description: Per-signal weights and boost thresholds for the C1 scorer.
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// Weights and boost thresholds for [`crate::scorer::ImpactScorer`].
///
/// Defaults match spec §4.1 exactly. Callers may override any weight; the
/// scorer renormalizes by the actual weight sum rather than assuming it is 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of the semantic-content signal.
    pub semantic_weight: f64,
    /// Weight of the requested-tool-permission signal.
    pub permission_weight: f64,
    /// Weight of the request-volume signal.
    pub volume_weight: f64,
    /// Weight of the context (night-hour / large-transaction) signal.
    pub context_weight: f64,
    /// Weight of the behavioral-drift signal.
    pub drift_weight: f64,
    /// Weight of the message priority factor.
    pub priority_weight: f64,
    /// Weight of the message type factor.
    pub type_weight: f64,
    /// Floor applied when the priority factor reaches critical (`1.0`).
    pub critical_priority_boost: f64,
    /// Floor applied when the semantic score exceeds `0.8`.
    pub high_semantic_boost: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.30,
            permission_weight: 0.20,
            volume_weight: 0.10,
            context_weight: 0.10,
            drift_weight: 0.15,
            priority_weight: 0.10,
            type_weight: 0.05,
            critical_priority_boost: 0.9,
            high_semantic_boost: 0.8,
        }
    }
}

impl ScoringConfig {
    /// Sum of the seven signal weights, used to renormalize the weighted sum.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.semantic_weight
            + self.permission_weight
            + self.volume_weight
            + self.context_weight
            + self.drift_weight
            + self.priority_weight
            + self.type_weight
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let config = ScoringConfig::default();
        assert!((config.total_weight() - 1.0).abs() < 1e-9);
    }
}
