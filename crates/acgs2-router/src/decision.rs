// crates/acgs2-router/src/decision.rs
// ============================================================================
// Module: Routing Decisions
// Description: The lane a message was routed to, and the outcome feedback
//              callers report back for adaptive threshold learning.
// ============================================================================

use acgs2_core::identifiers::ItemId;
use acgs2_core::identifiers::MessageId;
use acgs2_core::UtcInstant;
use serde::Deserialize;
use serde::Serialize;

/// Which processing path a message was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    /// Low impact: delivered immediately, no deliberation.
    Fast,
    /// High impact: enqueued for human review and/or multi-agent consensus.
    Deliberation,
}

/// The result of routing a single message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// The routed message's id.
    pub message_id: MessageId,
    /// The lane the message was sent down.
    pub lane: Lane,
    /// The impact score that drove this decision.
    pub impact_score: f64,
    /// The deliberation item id, present only when `lane` is `Deliberation`.
    pub item_id: Option<ItemId>,
    /// When this decision was made.
    pub decided_at: UtcInstant,
    /// Whether this routing bypassed the threshold via `force_deliberation`.
    pub forced: bool,
    /// The reason supplied to `force_deliberation`, if forced.
    pub force_reason: Option<String>,
}

/// How a previously routed message's outcome turned out, reported back to
/// the router by the caller for adaptive threshold learning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackOutcome {
    /// A deliberation-bound message was approved.
    Approved,
    /// A deliberation-bound message was rejected.
    Rejected,
    /// A deliberation-bound message timed out with no resolution.
    Timeout,
    /// A fast-lane message completed without incident.
    Success,
    /// A fast-lane message failed downstream, suggesting it should have been
    /// routed to deliberation (a false negative).
    Failure,
}
