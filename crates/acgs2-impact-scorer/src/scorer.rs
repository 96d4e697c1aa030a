// crates/acgs2-impact-scorer/src/scorer.rs
// ============================================================================
// Module: Impact Scorer
// Description: C1 — multi-dimensional impact scoring for governance messages.
// Purpose: Combine semantic, permission, volume, context, drift, priority, and
//          type signals into a single score in [0, 1].
// Dependencies: acgs2-core, tracing
// ============================================================================

//! ## Overview
//! [`ImpactScorer`] holds no global state: every caller constructs its own
//! instance and owns its lifetime, replacing the original source's
//! `_impact_scorer` module-level singleton and `get_impact_scorer()` accessor.
//! Per-agent volume and drift history live behind `Mutex`-guarded maps inside
//! the scorer itself, so a single instance is safe to share across threads
//! behind an `Arc`.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use acgs2_core::identifiers::AgentId;
use acgs2_core::Message;
use acgs2_core::UtcInstant;
use time::Duration;

use crate::config::ScoringConfig;
use crate::embedding::EmbeddingProvider;
use crate::keywords::keyword_fallback_score;
use crate::signals::context_signal;
use crate::signals::permission_signal;

/// Sliding window over which request volume is measured.
const RATE_WINDOW: Duration = Duration::seconds(60);
/// Number of past context scores retained per agent for drift detection.
const DRIFT_HISTORY_WINDOW: usize = 20;
/// Deviation from an agent's historical mean that triggers a drift signal.
const DRIFT_THRESHOLD: f64 = 0.3;

/// Calculates impact scores for governance messages.
///
/// Construct one per process (or per tenant, if isolation is required) and
/// share it behind an `Arc` across the router and saga orchestrator; its
/// internal state is mutex-guarded and safe for concurrent use.
pub struct ImpactScorer {
    config: ScoringConfig,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    request_log: Mutex<HashMap<AgentId, VecDeque<UtcInstant>>>,
    drift_history: Mutex<HashMap<AgentId, VecDeque<f64>>>,
}

impl ImpactScorer {
    /// Creates a scorer using the keyword-matching semantic fallback only.
    #[must_use]
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            embedding_provider: None,
            request_log: Mutex::new(HashMap::new()),
            drift_history: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a scorer backed by a real embedding model.
    #[must_use]
    pub fn with_embedding_provider(
        config: ScoringConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            config,
            embedding_provider: Some(provider),
            request_log: Mutex::new(HashMap::new()),
            drift_history: Mutex::new(HashMap::new()),
        }
    }

    /// Calculates the impact score of `message` as observed at `now`.
    ///
    /// `now` is threaded through explicitly (rather than read internally)
    /// so callers, and tests, control exactly what instant drives the
    /// night-hour context boost and the volume window.
    #[must_use]
    pub fn score(&self, message: &Message, now: UtcInstant) -> f64 {
        let text = message.text_content();
        let semantic_score = self.semantic_signal(&text);
        let permission_score = permission_signal(&message.content);
        let volume_score = self.volume_signal(&message.from_agent, now);
        let context_score = context_signal(&message.content, now);
        let drift_score = self.drift_signal(&message.from_agent, context_score);
        let priority_factor = message.priority.priority_signal();
        let type_factor = message.message_type.type_signal();

        let weighted = (semantic_score * self.config.semantic_weight)
            + (permission_score * self.config.permission_weight)
            + (volume_score * self.config.volume_weight)
            + (context_score * self.config.context_weight)
            + (drift_score * self.config.drift_weight)
            + (priority_factor * self.config.priority_weight)
            + (type_factor * self.config.type_weight);

        let total_weight = self.config.total_weight();
        let combined = if total_weight > 0.0 { weighted / total_weight } else { weighted };

        let mut boosted = combined;
        if priority_factor >= 1.0 {
            boosted = boosted.max(self.config.critical_priority_boost);
        }
        if semantic_score > 0.8 {
            boosted = boosted.max(self.config.high_semantic_boost);
        }

        boosted.clamp(0.0, 1.0)
    }

    /// Scores free text via the embedding provider, falling back to keyword matching.
    fn semantic_signal(&self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        match &self.embedding_provider {
            Some(provider) => provider
                .similarity_to_high_impact_set(text)
                .unwrap_or_else(|| keyword_fallback_score(text)),
            None => keyword_fallback_score(text),
        }
    }

    /// Scores request volume for `agent_id` within the 60-second rate window.
    fn volume_signal(&self, agent_id: &AgentId, now: UtcInstant) -> f64 {
        let mut log = self
            .request_log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let entries = log.entry(agent_id.clone()).or_default();
        entries.push_back(now);
        while let Some(oldest) = entries.front() {
            if now.elapsed_since(*oldest) >= RATE_WINDOW {
                entries.pop_front();
            } else {
                break;
            }
        }

        let rate = entries.len();
        if rate < 10 {
            0.1
        } else if rate < 50 {
            0.4
        } else if rate < 100 {
            0.7
        } else {
            1.0
        }
    }

    /// Scores how far `baseline` deviates from the agent's historical mean.
    fn drift_signal(&self, agent_id: &AgentId, baseline: f64) -> f64 {
        let mut history = self
            .drift_history
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(past) = history.get_mut(agent_id) else {
            history.insert(agent_id.clone(), VecDeque::from([baseline]));
            return 0.0;
        };

        let mean: f64 = past.iter().sum::<f64>() / past.len() as f64;
        let deviation = (baseline - mean).abs();

        past.push_back(baseline);
        if past.len() > DRIFT_HISTORY_WINDOW {
            past.pop_front();
        }

        if deviation > DRIFT_THRESHOLD {
            tracing::warn!(
                agent_id = agent_id.as_str(),
                deviation,
                "behavioral context drift detected"
            );
            ((deviation / DRIFT_THRESHOLD) * 0.5).min(1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;
    use acgs2_core::identifiers::MessageId;
    use acgs2_core::identifiers::TenantId;
    use acgs2_core::ContentMap;
    use acgs2_core::MessageType;
    use acgs2_core::Priority;
    use time::OffsetDateTime;

    fn fixed_noon() -> UtcInstant {
        UtcInstant::from_offset_date_time(
            OffsetDateTime::from_unix_timestamp(1_700_000_000)
                .expect("valid timestamp")
                .replace_hour(12)
                .expect("valid hour"),
        )
    }

    fn message(content: ContentMap, message_type: MessageType, priority: Priority) -> Message {
        Message::new(
            MessageId::from("msg-1"),
            AgentId::from("agent-1"),
            AgentId::from("agent-2"),
            TenantId::from("tenant-1"),
            content,
            message_type,
            priority,
        )
    }

    #[test]
    fn critical_priority_boosts_to_point_nine_floor() {
        let scorer = ImpactScorer::new(ScoringConfig::default());
        let msg = message(ContentMap::new(), MessageType::Command, Priority::Critical);
        let score = scorer.score(&msg, fixed_noon());
        assert!(score >= 0.9);
    }

    #[test]
    fn high_semantic_relevance_boosts_to_point_eight_floor() {
        let scorer = ImpactScorer::new(ScoringConfig::default());
        let mut content = ContentMap::new();
        content.insert(
            "content",
            serde_json::json!("critical security breach violation emergency"),
        );
        let msg = message(content, MessageType::Command, Priority::Low);
        let score = scorer.score(&msg, fixed_noon());
        assert!(score >= 0.8);
    }

    #[test]
    fn quiet_routine_message_scores_low() {
        let scorer = ImpactScorer::new(ScoringConfig::default());
        let msg = message(ContentMap::new(), MessageType::Query, Priority::Low);
        let score = scorer.score(&msg, fixed_noon());
        assert!(score < 0.3);
    }

    #[test]
    fn repeated_requests_raise_volume_signal() {
        let scorer = ImpactScorer::new(ScoringConfig::default());
        let agent = AgentId::from("agent-1");
        let now = fixed_noon();
        for _ in 0..60 {
            assert!((0.0..=1.0).contains(&scorer.volume_signal(&agent, now)));
        }
        assert!((scorer.volume_signal(&agent, now) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn first_observation_never_drifts() {
        let scorer = ImpactScorer::new(ScoringConfig::default());
        let agent = AgentId::from("agent-1");
        assert!((scorer.drift_signal(&agent, 0.9) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn large_deviation_from_baseline_is_flagged() {
        let scorer = ImpactScorer::new(ScoringConfig::default());
        let agent = AgentId::from("agent-1");
        scorer.drift_signal(&agent, 0.2);
        let drift = scorer.drift_signal(&agent, 0.95);
        assert!(drift > 0.0);
    }
}
