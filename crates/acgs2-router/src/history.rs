// crates/acgs2-router/src/history.rs
// ============================================================================
// Module: Routing History and Performance Metrics
// Description: The learning data the adaptive router analyzes to adjust its
//              impact threshold.
// ============================================================================

use acgs2_core::identifiers::MessageId;
use acgs2_core::MessageType;
use acgs2_core::Priority;
use acgs2_core::UtcInstant;

use crate::decision::FeedbackOutcome;
use crate::decision::Lane;

/// Maximum number of routing decisions retained for learning. Matches the
/// original source's fixed `1000`-entry retention.
pub const MAX_HISTORY_ENTRIES: usize = 1000;
/// Number of most-recent entries analyzed per threshold adjustment. Matches
/// the original source's fixed `100`-entry analysis window.
pub const ANALYSIS_WINDOW: usize = 100;
/// Minimum history size before threshold adjustment is attempted.
pub const MIN_HISTORY_FOR_ADJUSTMENT: usize = 50;

/// One routing decision retained for later feedback and threshold learning.
#[derive(Debug, Clone)]
pub struct RoutingHistoryEntry {
    /// The routed message's id.
    pub message_id: MessageId,
    /// The impact score at decision time.
    pub impact_score: f64,
    /// The lane chosen.
    pub lane: Lane,
    /// The message's type, retained for offline analysis.
    pub message_type: MessageType,
    /// The message's priority, retained for offline analysis.
    pub priority: Priority,
    /// When the decision was made.
    pub decided_at: UtcInstant,
    /// Outcome feedback, if the caller has reported one.
    pub actual_outcome: Option<FeedbackOutcome>,
    /// Human feedback score in `[0, 1]`, if supplied.
    pub feedback_score: Option<f64>,
}

/// Aggregate routing counters, mirroring the original source's
/// `performance_metrics` dict.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceMetrics {
    /// Every message ever routed.
    pub total_messages: u64,
    /// Messages routed to the fast lane.
    pub fast_lane_count: u64,
    /// Messages routed to deliberation.
    pub deliberation_count: u64,
    /// Deliberation-bound messages later reported approved.
    pub deliberation_approved: u64,
    /// Deliberation-bound messages later reported rejected.
    pub deliberation_rejected: u64,
    /// Deliberation-bound messages later reported timed out.
    pub deliberation_timeout: u64,
    /// Deliberation decisions later judged unnecessary (high feedback score).
    pub false_positives: u64,
    /// Fast-lane decisions later judged as having needed deliberation.
    pub false_negatives: u64,
}
