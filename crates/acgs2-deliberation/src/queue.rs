// crates/acgs2-deliberation/src/queue.rs
// ============================================================================
// Module: Deliberation Queue
// Description: C3 — owns every in-flight deliberation item, keyed by item id.
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use acgs2_core::identifiers::AgentId;
use acgs2_core::identifiers::ItemId;
use acgs2_core::Message;
use acgs2_core::UtcInstant;
use time::Duration;

use crate::error::DeliberationError;
use crate::item::DeliberationItem;
use crate::status::DeliberationStatus;
use crate::vote::AgentVote;

/// Number of agent votes required by default when multi-agent voting is
/// requested. Matches the original source's fixed `required_votes=5`.
const DEFAULT_REQUIRED_VOTES: usize = 5;

/// Aggregate counters across every item this queue has ever resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueStats {
    /// Items ever enqueued.
    pub total_queued: u64,
    /// Items that resolved approved (human or consensus).
    pub approved: u64,
    /// Items that resolved rejected.
    pub rejected: u64,
    /// Items that timed out with no resolution.
    pub timed_out: u64,
}

/// Owns every deliberation item and dispatches human decisions and agent
/// votes to the right one.
pub struct DeliberationQueue {
    items: Mutex<HashMap<ItemId, Arc<DeliberationItem>>>,
    stats: Mutex<QueueStats>,
    default_timeout: Duration,
    consensus_threshold: f64,
}

impl DeliberationQueue {
    /// Creates an empty queue with the given default timeout and consensus
    /// threshold (fraction of approving votes required, e.g. `0.66`).
    #[must_use]
    pub fn new(default_timeout: Duration, consensus_threshold: f64) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            stats: Mutex::new(QueueStats::default()),
            default_timeout,
            consensus_threshold,
        }
    }

    /// Enqueues `message` for deliberation, opening it immediately for review
    /// (`UnderReview`; see `DESIGN.md` on the original's missing transition).
    ///
    /// `agent_weights`, if supplied, switches consensus scoring from a plain
    /// approval ratio to a weighted sum of approving votes over the weighted
    /// total.
    ///
    /// Returns the new item's id and a handle to await its resolution.
    pub fn enqueue_for_deliberation(
        &self,
        item_id: ItemId,
        message: Message,
        requires_human_review: bool,
        requires_multi_agent_vote: bool,
        agent_weights: Option<HashMap<AgentId, f64>>,
        timeout: Option<Duration>,
        now: UtcInstant,
    ) -> Arc<DeliberationItem> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let required_votes = if requires_multi_agent_vote { DEFAULT_REQUIRED_VOTES } else { 0 };

        let item = Arc::new(DeliberationItem::new(
            item_id.clone(),
            message,
            requires_human_review,
            requires_multi_agent_vote,
            required_votes,
            self.consensus_threshold,
            agent_weights,
            now,
            now + timeout,
        ));

        self.locked_items().insert(item_id, Arc::clone(&item));
        self.locked_stats().total_queued += 1;

        tracing::info!(
            item_id = item.item_id.as_str(),
            human_review = requires_human_review,
            multi_agent = requires_multi_agent_vote,
            "enqueued message for deliberation"
        );

        item
    }

    /// Looks up an item by id.
    #[must_use]
    pub fn get(&self, item_id: &ItemId) -> Option<Arc<DeliberationItem>> {
        self.locked_items().get(item_id).cloned()
    }

    /// Submits a human reviewer's decision for `item_id`.
    ///
    /// # Errors
    /// Returns [`DeliberationError::ItemNotFound`] if no such item exists.
    pub fn submit_human_decision(
        &self,
        item_id: &ItemId,
        reviewer: AgentId,
        approve: bool,
        reasoning: String,
        now: UtcInstant,
    ) -> Result<bool, DeliberationError> {
        let item = self.get(item_id).ok_or_else(|| DeliberationError::ItemNotFound(item_id.clone()))?;
        let accepted = item.submit_human_decision(reviewer, approve, reasoning, now);
        if accepted {
            self.record_terminal(item.status());
        }
        Ok(accepted)
    }

    /// Submits an agent's vote for `item_id`. Returns `true` if this vote
    /// brought the item to consensus.
    ///
    /// # Errors
    /// Returns [`DeliberationError::ItemNotFound`] if no such item exists.
    pub fn submit_agent_vote(&self, item_id: &ItemId, vote: AgentVote) -> Result<bool, DeliberationError> {
        let item = self.get(item_id).ok_or_else(|| DeliberationError::ItemNotFound(item_id.clone()))?;
        let reached = item.submit_agent_vote(vote);
        if reached {
            self.record_terminal(item.status());
        }
        Ok(reached)
    }

    /// Waits for `item_id` to resolve, returning its terminal status.
    ///
    /// # Errors
    /// Returns [`DeliberationError::ItemNotFound`] if no such item exists.
    pub async fn wait_for_resolution(
        &self,
        item_id: &ItemId,
        now: UtcInstant,
    ) -> Result<DeliberationStatus, DeliberationError> {
        let item = self.get(item_id).ok_or_else(|| DeliberationError::ItemNotFound(item_id.clone()))?;
        let status = item.wait_for_resolution(now).await;
        if status == DeliberationStatus::TimedOut {
            self.record_terminal(status);
        }
        Ok(status)
    }

    /// Returns current aggregate statistics.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        *self.locked_stats()
    }

    fn record_terminal(&self, status: DeliberationStatus) {
        let mut stats = self.locked_stats();
        match status {
            DeliberationStatus::Approved | DeliberationStatus::ConsensusReached => stats.approved += 1,
            DeliberationStatus::Rejected => stats.rejected += 1,
            DeliberationStatus::TimedOut => stats.timed_out += 1,
            DeliberationStatus::Pending | DeliberationStatus::UnderReview => {}
        }
    }

    fn locked_items(&self) -> std::sync::MutexGuard<'_, HashMap<ItemId, Arc<DeliberationItem>>> {
        self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn locked_stats(&self) -> std::sync::MutexGuard<'_, QueueStats> {
        self.stats.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
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

    fn sample_message() -> Message {
        Message::new(
            MessageId::from("msg-1"),
            AgentId::from("agent-a"),
            AgentId::from("agent-b"),
            TenantId::from("tenant-1"),
            ContentMap::new(),
            MessageType::GovernanceRequest,
            Priority::Critical,
        )
    }

    #[tokio::test]
    async fn human_decision_resolves_item_and_updates_stats() {
        let queue = DeliberationQueue::new(Duration::seconds(300), 0.66);
        let now = UtcInstant::now();
        let item = queue.enqueue_for_deliberation(
            ItemId::from("item-1"),
            sample_message(),
            true,
            false,
            None,
            None,
            now,
        );

        let accepted = queue
            .submit_human_decision(&item.item_id, AgentId::from("reviewer-1"), true, "ok".into(), now)
            .expect("item exists");
        assert!(accepted);

        let status = queue.wait_for_resolution(&item.item_id, now).await.expect("item exists");
        assert_eq!(status, DeliberationStatus::Approved);
        assert_eq!(queue.stats().approved, 1);
        assert_eq!(item.message().status, acgs2_core::MessageStatus::Delivered);
    }

    #[tokio::test]
    async fn unknown_item_returns_not_found() {
        let queue = DeliberationQueue::new(Duration::seconds(300), 0.66);
        let result = queue.submit_human_decision(
            &ItemId::from("missing"),
            AgentId::from("reviewer-1"),
            true,
            "ok".into(),
            UtcInstant::now(),
        );
        assert!(result.is_err());
    }
}
