// crates/acgs2-router/src/router.rs
// ============================================================================
// Module: Adaptive Router
// Description: C2 — routes messages to the fast lane or deliberation based on
//              impact score, and adapts its threshold from outcome feedback.
// Dependencies: acgs2-core, acgs2-impact-scorer, acgs2-deliberation
// ============================================================================

//! ## Overview
//! [`AdaptiveRouter`] holds no global state; callers construct one per
//! process (or per tenant) and share it behind an `Arc`, replacing the
//! original source's `_adaptive_router` singleton. The impact threshold
//! itself adapts over time from reported feedback; see
//! [`AdaptiveRouter::adjust_threshold`] for the false-negative-rate fix noted
//! in `DESIGN.md`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use acgs2_core::identifiers::ItemId;
use acgs2_core::identifiers::MessageId;
use acgs2_core::Message;
use acgs2_core::MessageStatus;
use acgs2_core::UtcInstant;
use acgs2_deliberation::DeliberationQueue;
use acgs2_impact_scorer::ImpactScorer;
use time::Duration;
use uuid::Uuid;

use crate::config::RouterConfig;
use crate::decision::FeedbackOutcome;
use crate::decision::Lane;
use crate::decision::RoutingDecision;
use crate::history::PerformanceMetrics;
use crate::history::RoutingHistoryEntry;
use crate::history::ANALYSIS_WINDOW;
use crate::history::MAX_HISTORY_ENTRIES;
use crate::history::MIN_HISTORY_FOR_ADJUSTMENT;

/// Minimum impact threshold the adaptive adjustment will settle at.
const MIN_THRESHOLD: f64 = 0.1;
/// Maximum impact threshold the adaptive adjustment will settle at.
const MAX_THRESHOLD: f64 = 0.95;
/// False-positive rate above which the threshold is nudged up.
const FALSE_POSITIVE_RATE_CEILING: f64 = 0.3;
/// False-negative rate above which the threshold is nudged down.
const FALSE_NEGATIVE_RATE_CEILING: f64 = 0.1;
/// Magnitude of each threshold nudge.
const THRESHOLD_STEP: f64 = 0.05;
/// Feedback score above which a deliberation decision is judged unnecessary.
const FALSE_POSITIVE_FEEDBACK_FLOOR: f64 = 0.8;

/// Routes messages to the fast lane or deliberation queue, per spec §4.2.
pub struct AdaptiveRouter {
    threshold: Mutex<f64>,
    deliberation_timeout: Duration,
    learning_enabled: bool,
    history: Mutex<VecDeque<RoutingHistoryEntry>>,
    metrics: Mutex<PerformanceMetrics>,
    scorer: Arc<ImpactScorer>,
    deliberation: Arc<DeliberationQueue>,
}

impl AdaptiveRouter {
    /// Creates a router over a shared scorer and deliberation queue.
    #[must_use]
    pub fn new(config: RouterConfig, scorer: Arc<ImpactScorer>, deliberation: Arc<DeliberationQueue>) -> Self {
        Self {
            threshold: Mutex::new(config.impact_threshold),
            deliberation_timeout: Duration::seconds(i64::try_from(config.deliberation_timeout_secs).unwrap_or(i64::MAX)),
            learning_enabled: config.enable_learning,
            history: Mutex::new(VecDeque::new()),
            metrics: Mutex::new(PerformanceMetrics::default()),
            scorer,
            deliberation,
        }
    }

    /// Returns the current impact threshold.
    #[must_use]
    pub fn impact_threshold(&self) -> f64 {
        *self.locked_threshold()
    }

    /// Manually overrides the impact threshold, clamped to `[0, 1]`.
    pub fn set_impact_threshold(&self, threshold: f64) {
        *self.locked_threshold() = threshold.clamp(0.0, 1.0);
    }

    /// Returns a snapshot of the aggregate routing metrics.
    #[must_use]
    pub fn metrics(&self) -> PerformanceMetrics {
        *self.locked_metrics()
    }

    /// Routes `message`: scores it if unscored, then sends it down the fast
    /// lane or into deliberation depending on the current threshold.
    pub fn route(&self, message: &mut Message, now: UtcInstant) -> RoutingDecision {
        self.locked_metrics().total_messages += 1;

        let impact_score = match message.impact_score {
            Some(score) => score,
            None => {
                let score = self.scorer.score(message, now);
                message.impact_score = Some(score);
                score
            }
        };

        let threshold = self.impact_threshold();
        if impact_score >= threshold {
            self.route_to_deliberation(message, impact_score, now, false, None)
        } else {
            self.route_to_fast_lane(message, impact_score, now)
        }
    }

    /// Forces `message` into deliberation regardless of its impact score,
    /// recording `reason` for audit. The message's stored score is left
    /// untouched; the decision's `impact_score` reports the forced `1.0`.
    pub fn force_deliberation(&self, message: &mut Message, reason: &str, now: UtcInstant) -> RoutingDecision {
        tracing::info!(message_id = message.id.as_str(), reason, "forcing message into deliberation");
        self.route_to_deliberation(message, 1.0, now, true, Some(reason.to_owned()))
    }

    fn route_to_fast_lane(&self, message: &mut Message, impact_score: f64, now: UtcInstant) -> RoutingDecision {
        self.locked_metrics().fast_lane_count += 1;
        message.mark_status(MessageStatus::Delivered, now);

        self.record_history(RoutingHistoryEntry {
            message_id: message.id.clone(),
            impact_score,
            lane: Lane::Fast,
            message_type: message.message_type,
            priority: message.priority,
            decided_at: now,
            actual_outcome: None,
            feedback_score: None,
        });

        tracing::info!(message_id = message.id.as_str(), impact_score, "routed to fast lane");

        RoutingDecision {
            message_id: message.id.clone(),
            lane: Lane::Fast,
            impact_score,
            item_id: None,
            decided_at: now,
            forced: false,
            force_reason: None,
        }
    }

    fn route_to_deliberation(
        &self,
        message: &mut Message,
        impact_score: f64,
        now: UtcInstant,
        forced: bool,
        force_reason: Option<String>,
    ) -> RoutingDecision {
        self.locked_metrics().deliberation_count += 1;
        message.mark_status(MessageStatus::Routing, now);

        let item_id = ItemId::from(Uuid::new_v4().to_string());
        self.deliberation.enqueue_for_deliberation(
            item_id.clone(),
            message.clone(),
            true,
            impact_score > 0.9,
            None,
            Some(self.deliberation_timeout),
            now,
        );

        self.record_history(RoutingHistoryEntry {
            message_id: message.id.clone(),
            impact_score,
            lane: Lane::Deliberation,
            message_type: message.message_type,
            priority: message.priority,
            decided_at: now,
            actual_outcome: None,
            feedback_score: None,
        });

        tracing::info!(
            message_id = message.id.as_str(),
            impact_score,
            item_id = item_id.as_str(),
            "routed to deliberation"
        );

        RoutingDecision {
            message_id: message.id.clone(),
            lane: Lane::Deliberation,
            impact_score,
            item_id: Some(item_id),
            decided_at: now,
            forced,
            force_reason,
        }
    }

    fn record_history(&self, entry: RoutingHistoryEntry) {
        if !self.learning_enabled {
            return;
        }
        let mut history = self.locked_history();
        history.push_back(entry);
        while history.len() > MAX_HISTORY_ENTRIES {
            history.pop_front();
        }
    }

    /// Reports how a previously routed message turned out, updating the
    /// aggregate counters and triggering a threshold re-evaluation.
    pub fn update_performance_feedback(
        &self,
        message_id: &MessageId,
        outcome: FeedbackOutcome,
        feedback_score: Option<f64>,
    ) {
        if !self.learning_enabled {
            return;
        }

        let lane = {
            let mut history = self.locked_history();
            let Some(entry) = history.iter_mut().rev().find(|entry| &entry.message_id == message_id) else {
                tracing::warn!(message_id = message_id.as_str(), "no routing history found for message");
                return;
            };
            entry.actual_outcome = Some(outcome);
            entry.feedback_score = feedback_score;
            entry.lane
        };

        if lane == Lane::Deliberation {
            let mut metrics = self.locked_metrics();
            match outcome {
                FeedbackOutcome::Approved => metrics.deliberation_approved += 1,
                FeedbackOutcome::Rejected => metrics.deliberation_rejected += 1,
                FeedbackOutcome::Timeout => metrics.deliberation_timeout += 1,
                FeedbackOutcome::Success | FeedbackOutcome::Failure => {}
            }
        }

        self.adjust_threshold();
    }

    /// Re-evaluates the impact threshold from the last [`ANALYSIS_WINDOW`]
    /// decisions, once at least [`MIN_HISTORY_FOR_ADJUSTMENT`] are on record.
    ///
    /// The false-negative rate is computed as
    /// `false_negatives / max(fast_lane_entries.len(), 1)`. The original
    /// source divides by the fast-lane *list itself* rather than its length —
    /// comparing a count against a list always satisfies Python's truthiness
    /// check, so the computed rate silently collapses to whatever value lets
    /// comparison pass; this port uses the length, as the surrounding code
    /// clearly intends.
    fn adjust_threshold(&self) {
        let history = self.locked_history();
        if history.len() < MIN_HISTORY_FOR_ADJUSTMENT {
            return;
        }

        let recent: Vec<&RoutingHistoryEntry> =
            history.iter().rev().take(ANALYSIS_WINDOW).collect();
        drop(history);

        let deliberation_entries: Vec<&RoutingHistoryEntry> =
            recent.iter().copied().filter(|entry| entry.lane == Lane::Deliberation).collect();
        let fast_lane_entries: Vec<&RoutingHistoryEntry> =
            recent.iter().copied().filter(|entry| entry.lane == Lane::Fast).collect();

        let false_positives = deliberation_entries
            .iter()
            .filter(|entry| entry.feedback_score.unwrap_or(0.5) > FALSE_POSITIVE_FEEDBACK_FLOOR)
            .count();
        let false_negatives = fast_lane_entries
            .iter()
            .filter(|entry| {
                matches!(entry.actual_outcome, Some(FeedbackOutcome::Failure) | Some(FeedbackOutcome::Timeout))
            })
            .count();

        let fp_rate = false_positives as f64 / (deliberation_entries.len().max(1) as f64);
        let fn_rate = false_negatives as f64 / (fast_lane_entries.len().max(1) as f64);

        let adjustment = if fp_rate > FALSE_POSITIVE_RATE_CEILING {
            THRESHOLD_STEP
        } else if fn_rate > FALSE_NEGATIVE_RATE_CEILING {
            -THRESHOLD_STEP
        } else {
            0.0
        };

        if adjustment == 0.0 {
            return;
        }

        let mut threshold = self.locked_threshold();
        let old = *threshold;
        let new = (old + adjustment).clamp(MIN_THRESHOLD, MAX_THRESHOLD);
        *threshold = new;
        if (new - old).abs() > 0.01 {
            tracing::info!(old_threshold = old, new_threshold = new, fp_rate, fn_rate, "adjusted impact threshold");
        }
    }

    fn locked_threshold(&self) -> std::sync::MutexGuard<'_, f64> {
        self.threshold.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn locked_history(&self) -> std::sync::MutexGuard<'_, VecDeque<RoutingHistoryEntry>> {
        self.history.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn locked_metrics(&self) -> std::sync::MutexGuard<'_, PerformanceMetrics> {
        self.metrics.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;
    use acgs2_core::identifiers::AgentId;
    use acgs2_core::identifiers::TenantId;
    use acgs2_core::ContentMap;
    use acgs2_core::MessageType;
    use acgs2_core::Priority;
    use acgs2_impact_scorer::ScoringConfig;

    fn router() -> AdaptiveRouter {
        let scorer = Arc::new(ImpactScorer::new(ScoringConfig::default()));
        let deliberation = Arc::new(DeliberationQueue::new(Duration::seconds(300), 0.66));
        AdaptiveRouter::new(RouterConfig::default(), scorer, deliberation)
    }

    fn message(priority: Priority) -> Message {
        Message::new(
            MessageId::from("msg-1"),
            AgentId::from("agent-a"),
            AgentId::from("agent-b"),
            TenantId::from("tenant-1"),
            ContentMap::new(),
            MessageType::Command,
            priority,
        )
    }

    #[test]
    fn low_impact_message_routes_to_fast_lane() {
        let router = router();
        let mut msg = message(Priority::Low);
        let decision = router.route(&mut msg, UtcInstant::now());
        assert_eq!(decision.lane, Lane::Fast);
        assert_eq!(router.metrics().fast_lane_count, 1);
        assert_eq!(msg.status, MessageStatus::Delivered);
    }

    #[test]
    fn critical_message_routes_to_deliberation() {
        let router = router();
        let mut msg = message(Priority::Critical);
        let decision = router.route(&mut msg, UtcInstant::now());
        assert_eq!(decision.lane, Lane::Deliberation);
        assert!(decision.item_id.is_some());
        assert_eq!(router.metrics().deliberation_count, 1);
    }

    #[test]
    fn force_deliberation_ignores_low_score() {
        let router = router();
        let mut msg = message(Priority::Low);
        let decision = router.force_deliberation(&mut msg, "manual_override", UtcInstant::now());
        assert_eq!(decision.lane, Lane::Deliberation);
        assert!(decision.forced);
        assert_eq!(decision.force_reason.as_deref(), Some("manual_override"));
        assert_eq!(msg.status, MessageStatus::Routing);
    }

    #[test]
    fn manual_threshold_override_is_clamped() {
        let router = router();
        router.set_impact_threshold(5.0);
        assert!((router.impact_threshold() - 1.0).abs() < f64::EPSILON);
    }
}
