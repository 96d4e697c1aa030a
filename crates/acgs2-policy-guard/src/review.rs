// crates/acgs2-policy-guard/src/review.rs
// ============================================================================
// Module: Critic Review Collector
// Description: `submit_for_review` and the registered-critic pool.
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration as StdDuration;

use acgs2_core::identifiers::CriticId;
use acgs2_core::identifiers::DecisionId;
use acgs2_core::UtcInstant;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Notify;

use crate::error::PolicyGuardError;

/// A critic agent's verdict on a decision under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewVerdict {
    /// The critic approves the decision.
    Approve,
    /// The critic rejects the decision.
    Reject,
    /// The critic declines to approve or reject, deferring to a human.
    Escalate,
}

/// A single critic's submitted review.
#[derive(Debug, Clone)]
pub struct CriticReview {
    /// The reviewing critic.
    pub critic_id: CriticId,
    /// The verdict reached.
    pub verdict: ReviewVerdict,
    /// Free-text justification.
    pub reasoning: String,
}

/// The consensus verdict reached across every review received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusVerdict {
    /// A strict majority of received verdicts approved.
    Approve,
    /// A strict majority of received verdicts rejected.
    Reject,
    /// No verdict holds a strict majority; the decision escalates to a human.
    Escalate,
}

/// The result of waiting out a review round.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    /// The consensus reached among reviews received before the deadline.
    pub consensus: ConsensusVerdict,
    /// Every review received, in submission order.
    pub reviews: Vec<CriticReview>,
}

/// A critic agent registered to take part in review rounds.
#[derive(Clone)]
pub struct CriticRegistration {
    /// The critic's identity.
    pub critic_id: CriticId,
    /// Review categories this critic is willing to weigh in on.
    pub review_types: Vec<String>,
    /// Opaque metadata attached at registration time (contact info, weight,
    /// specialization tags).
    pub metadata: Value,
}

struct PendingState {
    reviews: HashMap<CriticId, CriticReview>,
    order: Vec<CriticId>,
}

struct PendingReview {
    invited: Vec<CriticId>,
    deadline: UtcInstant,
    state: Mutex<PendingState>,
    notify: Notify,
}

impl PendingReview {
    /// Opens a round inviting every critic in `invited`.
    fn new(invited: Vec<CriticId>, deadline: UtcInstant) -> Self {
        Self {
            invited,
            deadline,
            state: Mutex::new(PendingState { reviews: HashMap::new(), order: Vec::new() }),
            notify: Notify::new(),
        }
    }

    /// Locks the interior state, recovering from poisoning.
    fn locked(&self) -> MutexGuard<'_, PendingState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Records `review`, returning `true` if every invited critic has now
    /// weighed in.
    fn accept(&self, review: CriticReview) -> bool {
        let mut state = self.locked();
        if !state.reviews.contains_key(&review.critic_id) {
            state.order.push(review.critic_id.clone());
        }
        state.reviews.insert(review.critic_id.clone(), review);
        let complete = state.reviews.len() >= self.invited.len();
        if complete {
            drop(state);
            self.notify.notify_waiters();
        }
        complete
    }

    /// Waits for every invited critic to respond or for `now` to pass the deadline.
    async fn wait(&self, now: UtcInstant) -> ReviewOutcome {
        let notified = self.notify.notified();
        tokio::pin!(notified);

        if self.locked().reviews.len() >= self.invited.len() {
            return self.outcome();
        }

        let remaining = self.deadline.elapsed_since(now);
        let budget =
            StdDuration::new(u64::try_from(remaining.whole_seconds().max(0)).unwrap_or(u64::MAX), 0);

        match tokio::time::timeout(budget, notified).await {
            Ok(()) | Err(_) => self.outcome(),
        }
    }

    /// Snapshots the current outcome without waiting.
    fn outcome(&self) -> ReviewOutcome {
        let state = self.locked();
        let reviews: Vec<CriticReview> =
            state.order.iter().filter_map(|id| state.reviews.get(id)).cloned().collect();
        ReviewOutcome { consensus: tally(&reviews), reviews }
    }
}

/// Majority of received votes; a tie (including zero votes) escalates.
fn tally(reviews: &[CriticReview]) -> ConsensusVerdict {
    if reviews.is_empty() {
        return ConsensusVerdict::Escalate;
    }
    let approvals = reviews.iter().filter(|review| review.verdict == ReviewVerdict::Approve).count();
    let rejections = reviews.iter().filter(|review| review.verdict == ReviewVerdict::Reject).count();
    let total = reviews.len();
    if approvals * 2 > total {
        ConsensusVerdict::Approve
    } else if rejections * 2 > total {
        ConsensusVerdict::Reject
    } else {
        ConsensusVerdict::Escalate
    }
}

/// Owns the registered critic pool and every in-flight review round.
#[derive(Default)]
pub struct ReviewCollector {
    critics: Mutex<HashMap<CriticId, CriticRegistration>>,
    pending: Mutex<HashMap<DecisionId, Arc<PendingReview>>>,
}

impl ReviewCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a critic agent.
    ///
    /// # Errors
    /// Returns [`PolicyGuardError::CriticAlreadyRegistered`] if `critic_id`
    /// is already registered.
    pub fn register_critic(&self, registration: CriticRegistration) -> Result<(), PolicyGuardError> {
        let mut critics = self.locked_critics();
        if critics.contains_key(&registration.critic_id) {
            return Err(PolicyGuardError::CriticAlreadyRegistered(registration.critic_id));
        }
        critics.insert(registration.critic_id.clone(), registration);
        Ok(())
    }

    /// Removes a registered critic. Idempotent: removing an unknown critic
    /// is not an error.
    pub fn unregister_critic(&self, critic_id: &CriticId) {
        self.locked_critics().remove(critic_id);
    }

    /// Returns the critics currently registered for `review_type`.
    #[must_use]
    pub fn critics_for(&self, review_type: &str) -> Vec<CriticId> {
        self.locked_critics()
            .values()
            .filter(|registration| registration.review_types.iter().any(|kind| kind == review_type))
            .map(|registration| registration.critic_id.clone())
            .collect()
    }

    /// Opens a new review round, inviting `reviewers`.
    pub fn open(&self, decision_id: DecisionId, reviewers: Vec<CriticId>, deadline: UtcInstant) {
        tracing::info!(
            decision_id = decision_id.as_str(),
            reviewers = reviewers.len(),
            "opened critic review round"
        );
        let round = Arc::new(PendingReview::new(reviewers, deadline));
        self.locked_pending().insert(decision_id, round);
    }

    /// Submits a critic's verdict toward `decision_id`'s review round.
    ///
    /// # Errors
    /// Returns [`PolicyGuardError::UnknownDecision`] if no round is open.
    pub fn submit(&self, decision_id: &DecisionId, review: CriticReview) -> Result<bool, PolicyGuardError> {
        let round = self
            .locked_pending()
            .get(decision_id)
            .cloned()
            .ok_or_else(|| PolicyGuardError::UnknownDecision(decision_id.clone()))?;
        Ok(round.accept(review))
    }

    /// Waits for `decision_id`'s round to complete or its deadline.
    ///
    /// # Errors
    /// Returns [`PolicyGuardError::UnknownDecision`] if no round is open.
    pub async fn wait(&self, decision_id: &DecisionId, now: UtcInstant) -> Result<ReviewOutcome, PolicyGuardError> {
        let round = self
            .locked_pending()
            .get(decision_id)
            .cloned()
            .ok_or_else(|| PolicyGuardError::UnknownDecision(decision_id.clone()))?;
        Ok(round.wait(now).await)
    }

    /// Locks the critic pool, recovering from poisoning.
    fn locked_critics(&self) -> MutexGuard<'_, HashMap<CriticId, CriticRegistration>> {
        self.critics.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Locks the pending-round table, recovering from poisoning.
    fn locked_pending(&self) -> MutexGuard<'_, HashMap<DecisionId, Arc<PendingReview>>> {
        self.pending.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use time::Duration;

    use super::*;

    fn review(critic: &str, verdict: ReviewVerdict) -> CriticReview {
        CriticReview { critic_id: CriticId::from(critic), verdict, reasoning: String::new() }
    }

    #[test]
    fn majority_approve_wins() {
        let reviews = vec![
            review("a", ReviewVerdict::Approve),
            review("b", ReviewVerdict::Approve),
            review("c", ReviewVerdict::Reject),
        ];
        assert_eq!(tally(&reviews), ConsensusVerdict::Approve);
    }

    #[test]
    fn tie_escalates() {
        let reviews = vec![review("a", ReviewVerdict::Approve), review("b", ReviewVerdict::Reject)];
        assert_eq!(tally(&reviews), ConsensusVerdict::Escalate);
    }

    #[test]
    fn no_reviews_escalates() {
        assert_eq!(tally(&[]), ConsensusVerdict::Escalate);
    }

    #[test]
    fn registering_the_same_critic_twice_errors() {
        let collector = ReviewCollector::new();
        let registration = CriticRegistration {
            critic_id: CriticId::from("critic-1"),
            review_types: vec!["safety".into()],
            metadata: Value::Null,
        };
        collector.register_critic(registration.clone()).expect("first registration succeeds");
        assert!(collector.register_critic(registration).is_err());
    }

    #[test]
    fn unregistering_an_unknown_critic_is_not_an_error() {
        let collector = ReviewCollector::new();
        collector.unregister_critic(&CriticId::from("ghost"));
    }

    #[tokio::test]
    async fn round_resolves_once_every_invited_critic_responds() {
        let collector = ReviewCollector::new();
        let decision_id = DecisionId::from("d1");
        let now = UtcInstant::now();
        collector.open(decision_id.clone(), vec![CriticId::from("a"), CriticId::from("b")], now + Duration::seconds(60));

        assert!(!collector.submit(&decision_id, review("a", ReviewVerdict::Approve)).expect("open"));
        assert!(collector.submit(&decision_id, review("b", ReviewVerdict::Approve)).expect("open"));

        let outcome = collector.wait(&decision_id, now).await.expect("open");
        assert_eq!(outcome.consensus, ConsensusVerdict::Approve);
        assert_eq!(outcome.reviews.len(), 2);
    }

    #[tokio::test]
    async fn incomplete_round_times_out_with_partial_reviews() {
        let collector = ReviewCollector::new();
        let decision_id = DecisionId::from("d2");
        let now = UtcInstant::now();
        collector.open(decision_id.clone(), vec![CriticId::from("a"), CriticId::from("b")], now + Duration::seconds(300));

        collector.submit(&decision_id, review("a", ReviewVerdict::Reject)).expect("open");
        let past_deadline = now + Duration::seconds(301);
        let outcome = collector.wait(&decision_id, past_deadline).await.expect("open");
        assert_eq!(outcome.reviews.len(), 1);
        assert_eq!(outcome.consensus, ConsensusVerdict::Escalate);
    }
}
