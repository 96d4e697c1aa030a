// crates/acgs2-deliberation/src/item.rs
// ============================================================================
// Module: Deliberation Item
// Description: A single message awaiting human review and/or multi-agent
//              consensus, with event-driven resolution.
// Dependencies: tokio (sync::Notify, time::timeout)
// ============================================================================

//! ## Overview
//! Resolution is signalled through a [`tokio::sync::Notify`] rather than
//! polled, mirroring the original source's `asyncio.Event`-based
//! `resolved_event` (its "V-04 FIX": replacing an `asyncio.sleep(1)` polling
//! loop with immediate wakeup on human decision or consensus).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use acgs2_core::identifiers::AgentId;
use acgs2_core::identifiers::ItemId;
use acgs2_core::Message;
use acgs2_core::MessageStatus;
use acgs2_core::UtcInstant;
use tokio::sync::Notify;

use crate::status::DeliberationStatus;
use crate::vote::AgentVote;
use crate::vote::VoteType;

/// Interior, mutex-guarded state that changes as review and voting progress.
struct ItemState {
    status: DeliberationStatus,
    votes: HashMap<AgentId, AgentVote>,
    human_reviewer: Option<AgentId>,
    human_reasoning: Option<String>,
    /// Kept alongside `status` so a terminal transition stamps both under
    /// the same lock (see [`DeliberationItem::message`]).
    message: Message,
}

/// A message enqueued for deliberation.
pub struct DeliberationItem {
    /// Unique identifier for this deliberation round.
    pub item_id: ItemId,
    /// Whether a human reviewer must approve or reject this item.
    pub requires_human_review: bool,
    /// Whether multi-agent voting is required to resolve this item.
    pub requires_multi_agent_vote: bool,
    /// Number of votes required before consensus can be checked. `0` when
    /// `requires_multi_agent_vote` is false.
    pub required_votes: usize,
    /// Fraction of non-abstaining votes that must approve for consensus.
    pub consensus_threshold: f64,
    /// Per-agent vote weights. When present, consensus is computed as
    /// `Σ weight(approve) / Σ weight(all votes)` instead of a plain vote
    /// count; an agent missing from this map votes with weight `1.0`.
    pub agent_weights: Option<HashMap<AgentId, f64>>,
    /// When this item was enqueued.
    pub created_at: UtcInstant,
    /// When this item's deliberation window elapses.
    pub deadline: UtcInstant,
    state: Mutex<ItemState>,
    notify: Notify,
}

impl DeliberationItem {
    /// Creates a new item already open for review (`UnderReview`).
    #[must_use]
    pub fn new(
        item_id: ItemId,
        message: Message,
        requires_human_review: bool,
        requires_multi_agent_vote: bool,
        required_votes: usize,
        consensus_threshold: f64,
        agent_weights: Option<HashMap<AgentId, f64>>,
        created_at: UtcInstant,
        deadline: UtcInstant,
    ) -> Self {
        Self {
            item_id,
            message,
            requires_human_review,
            requires_multi_agent_vote,
            required_votes,
            consensus_threshold,
            agent_weights,
            created_at,
            deadline,
            state: Mutex::new(ItemState {
                status: DeliberationStatus::UnderReview,
                votes: HashMap::new(),
                human_reviewer: None,
                human_reasoning: None,
                message,
            }),
            notify: Notify::new(),
        }
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> DeliberationStatus {
        self.locked_state().status
    }

    /// Returns a snapshot of the message under review, reflecting any
    /// terminal status already reached.
    #[must_use]
    pub fn message(&self) -> Message {
        self.locked_state().message.clone()
    }

    /// Returns the votes cast so far.
    #[must_use]
    pub fn votes(&self) -> Vec<AgentVote> {
        self.locked_state().votes.values().cloned().collect()
    }

    /// Records a human reviewer's decision, transitioning `UnderReview` to a
    /// terminal status.
    ///
    /// Idempotent: once the item has left `UnderReview`, later calls return
    /// `false` without changing state, matching the original's "return False"
    /// fallback rather than erroring.
    pub fn submit_human_decision(
        &self,
        reviewer: AgentId,
        approve: bool,
        reasoning: String,
        now: UtcInstant,
    ) -> bool {
        let mut state = self.locked_state();
        if state.status != DeliberationStatus::UnderReview {
            return false;
        }
        let status = if approve { DeliberationStatus::Approved } else { DeliberationStatus::Rejected };
        state.status = status;
        state.human_reviewer = Some(reviewer);
        state.human_reasoning = Some(reasoning);
        let message_status = if approve { MessageStatus::Delivered } else { MessageStatus::Failed };
        state.message.mark_status(message_status, now);
        drop(state);
        self.notify.notify_waiters();
        true
    }

    /// Records or overwrites an agent's vote, then checks for consensus.
    ///
    /// Returns `true` if this vote brought the item to `ConsensusReached`.
    pub fn submit_agent_vote(&self, vote: AgentVote) -> bool {
        let mut state = self.locked_state();
        if state.status.is_terminal() {
            return false;
        }
        let cast_at = vote.cast_at;
        state.votes.insert(vote.agent_id.clone(), vote);

        if check_consensus(
            state.votes.values(),
            self.required_votes,
            self.consensus_threshold,
            self.agent_weights.as_ref(),
        ) {
            state.status = DeliberationStatus::ConsensusReached;
            state.message.mark_status(MessageStatus::Delivered, cast_at);
            drop(state);
            self.notify.notify_waiters();
            true
        } else {
            false
        }
    }

    /// Waits for a terminal status, or marks the item `TimedOut` once `now`
    /// reaches `deadline`.
    ///
    /// Uses the standard `Notify` race-free pattern: the notified future is
    /// created before the status is checked, so a resolution racing with this
    /// call is never missed.
    pub async fn wait_for_resolution(&self, now: UtcInstant) -> DeliberationStatus {
        let notified = self.notify.notified();
        tokio::pin!(notified);

        let status = self.status();
        if status.is_terminal() {
            return status;
        }

        let remaining = self.deadline.elapsed_since(now);
        let budget = StdDuration::new(
            u64::try_from(remaining.whole_seconds().max(0)).unwrap_or(u64::MAX),
            0,
        );

        match tokio::time::timeout(budget, notified).await {
            Ok(()) => self.status(),
            Err(_) => {
                let mut state = self.locked_state();
                if !state.status.is_terminal() {
                    state.status = DeliberationStatus::TimedOut;
                    state.message.mark_status(MessageStatus::Expired, now);
                }
                state.status
            }
        }
    }

    fn locked_state(&self) -> std::sync::MutexGuard<'_, ItemState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Checks whether enough approving votes have been cast to reach consensus.
///
/// Requires at least one vote and at least `required_votes` votes total;
/// the approval ratio is computed over all cast votes, including abstentions
/// in the denominator, matching the original's `approve_count / len(votes)`.
///
/// When `agent_weights` is supplied, uses the weighted variant instead:
/// `Σ weight(approve) / Σ weight(all votes)`, with any agent missing from the
/// map defaulting to weight `1.0`.
fn check_consensus<'a>(
    votes: impl Iterator<Item = &'a AgentVote> + Clone,
    required_votes: usize,
    consensus_threshold: f64,
    agent_weights: Option<&HashMap<AgentId, f64>>,
) -> bool {
    let total = votes.clone().count();
    if total == 0 || total < required_votes {
        return false;
    }

    if let Some(weights) = agent_weights {
        let weight_of = |vote: &AgentVote| weights.get(&vote.agent_id).copied().unwrap_or(1.0);
        let total_weight: f64 = votes.clone().map(weight_of).sum();
        if total_weight <= 0.0 {
            return false;
        }
        let approve_weight: f64 =
            votes.filter(|vote| vote.vote == VoteType::Approve).map(weight_of).sum();
        (approve_weight / total_weight) >= consensus_threshold
    } else {
        let approvals = votes.filter(|vote| vote.vote == VoteType::Approve).count();
        (approvals as f64 / total as f64) >= consensus_threshold
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;
    use acgs2_core::identifiers::AgentId;
    use acgs2_core::identifiers::MessageId;
    use acgs2_core::identifiers::TenantId;
    use acgs2_core::ContentMap;
    use acgs2_core::MessageType;
    use acgs2_core::Priority;
    use time::Duration;

    fn sample_item(now: UtcInstant, required_votes: usize) -> DeliberationItem {
        sample_item_with_weights(now, required_votes, 0.66, None)
    }

    fn sample_item_with_weights(
        now: UtcInstant,
        required_votes: usize,
        consensus_threshold: f64,
        agent_weights: Option<HashMap<AgentId, f64>>,
    ) -> DeliberationItem {
        let message = Message::new(
            MessageId::from("msg-1"),
            AgentId::from("agent-a"),
            AgentId::from("agent-b"),
            TenantId::from("tenant-1"),
            ContentMap::new(),
            MessageType::GovernanceRequest,
            Priority::High,
        );
        DeliberationItem::new(
            ItemId::from("item-1"),
            message,
            true,
            required_votes > 0,
            required_votes,
            consensus_threshold,
            agent_weights,
            now,
            now + Duration::seconds(300),
        )
    }

    fn cast(item: &DeliberationItem, agent: &str, vote: VoteType, now: UtcInstant) -> bool {
        item.submit_agent_vote(AgentVote {
            agent_id: AgentId::from(agent),
            vote,
            reasoning: String::new(),
            confidence: 1.0,
            cast_at: now,
        })
    }

    #[test]
    fn human_decision_is_rejected_once_already_resolved() {
        let now = UtcInstant::now();
        let item = sample_item(now, 0);
        assert!(item.submit_human_decision(AgentId::from("reviewer-1"), true, "looks fine".into(), now));
        assert_eq!(item.status(), DeliberationStatus::Approved);
        assert_eq!(item.message().status, acgs2_core::MessageStatus::Delivered);
        assert!(!item.submit_human_decision(AgentId::from("reviewer-2"), false, "too late".into(), now));
        assert_eq!(item.status(), DeliberationStatus::Approved);
    }

    #[test]
    fn repeated_vote_from_same_agent_overwrites() {
        let now = UtcInstant::now();
        let item = sample_item(now, 2);
        item.submit_agent_vote(AgentVote {
            agent_id: AgentId::from("agent-x"),
            vote: VoteType::Reject,
            reasoning: "initial".into(),
            confidence: 1.0,
            cast_at: now,
        });
        item.submit_agent_vote(AgentVote {
            agent_id: AgentId::from("agent-x"),
            vote: VoteType::Approve,
            reasoning: "reconsidered".into(),
            confidence: 1.0,
            cast_at: now,
        });
        assert_eq!(item.votes().len(), 1);
        assert_eq!(item.votes()[0].vote, VoteType::Approve);
    }

    #[test]
    fn consensus_reached_once_threshold_met() {
        let now = UtcInstant::now();
        let item = sample_item(now, 2);
        assert!(!item.submit_agent_vote(AgentVote {
            agent_id: AgentId::from("agent-a"),
            vote: VoteType::Approve,
            reasoning: String::new(),
            confidence: 1.0,
            cast_at: now,
        }));
        assert!(item.submit_agent_vote(AgentVote {
            agent_id: AgentId::from("agent-b"),
            vote: VoteType::Approve,
            reasoning: String::new(),
            confidence: 1.0,
            cast_at: now,
        }));
        assert_eq!(item.status(), DeliberationStatus::ConsensusReached);
    }

    #[tokio::test]
    async fn wait_for_resolution_returns_immediately_once_decided() {
        let now = UtcInstant::now();
        let item = sample_item(now, 0);
        item.submit_human_decision(AgentId::from("reviewer-1"), false, "denied".into(), now);
        let status = item.wait_for_resolution(now).await;
        assert_eq!(status, DeliberationStatus::Rejected);
    }

    #[tokio::test]
    async fn wait_for_resolution_times_out_past_deadline() {
        let now = UtcInstant::now();
        let item = sample_item(now, 0);
        let past_deadline = now + Duration::seconds(301);
        let status = item.wait_for_resolution(past_deadline).await;
        assert_eq!(status, DeliberationStatus::TimedOut);
        assert_eq!(item.message().status, acgs2_core::MessageStatus::Expired);
    }

    #[test]
    fn weighted_consensus_wins_on_one_heavy_approval() {
        let now = UtcInstant::now();
        let weights = HashMap::from([
            (AgentId::from("agent-heavy"), 10.0),
            (AgentId::from("agent-a"), 1.0),
            (AgentId::from("agent-b"), 1.0),
        ]);
        let item = sample_item_with_weights(now, 3, 0.6, Some(weights));
        assert!(!cast(&item, "agent-a", VoteType::Reject, now));
        assert!(!cast(&item, "agent-b", VoteType::Reject, now));
        // Unweighted this would be 1/3 approval; weighted it's 10/12.
        assert!(cast(&item, "agent-heavy", VoteType::Approve, now));
        assert_eq!(item.status(), DeliberationStatus::ConsensusReached);
    }

    #[test]
    fn equal_weight_majority_can_still_fail_threshold() {
        let now = UtcInstant::now();
        let weights = HashMap::from([
            (AgentId::from("agent-a"), 1.0),
            (AgentId::from("agent-b"), 1.0),
            (AgentId::from("agent-c"), 1.0),
        ]);
        let item = sample_item_with_weights(now, 3, 0.7, Some(weights));
        assert!(!cast(&item, "agent-a", VoteType::Approve, now));
        assert!(!cast(&item, "agent-b", VoteType::Approve, now));
        // 2/3 approval weight is a majority but still short of a 0.7 threshold.
        assert!(!cast(&item, "agent-c", VoteType::Reject, now));
        assert_eq!(item.status(), DeliberationStatus::UnderReview);
    }
}
