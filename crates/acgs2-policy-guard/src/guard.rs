// crates/acgs2-policy-guard/src/guard.rs
// ============================================================================
// Module: Policy Guard
// Description: The `PolicyGuard` capability trait and its constitutional,
//              signature- and review-aware implementation.
// ============================================================================

use acgs2_core::constitutional::CONSTITUTIONAL_HASH;
use acgs2_core::identifiers::AgentId;
use acgs2_core::identifiers::CriticId;
use acgs2_core::identifiers::DecisionId;
use acgs2_core::UtcInstant;
use async_trait::async_trait;
use time::Duration;

use crate::action::GuardAction;
use crate::action::GuardContext;
use crate::decision::PolicyDecider;
use crate::decision::PolicyDecision;
use crate::error::PolicyGuardError;
use crate::result::GuardDecisionKind;
use crate::result::GuardResult;
use crate::review::ConsensusVerdict;
use crate::review::CriticRegistration;
use crate::review::CriticReview;
use crate::review::ReviewCollector;
use crate::review::ReviewOutcome;
use crate::signature::SignatureCollector;
use crate::signature::SignatureOutcome;

/// VERIFY-BEFORE-ACT: the capability interface every policy guard implements.
///
/// Collapses the original "OPA guard mixin" inheritance hierarchy into one
/// trait with five methods, matching the composite-policy seam the rest of
/// the governance core dispatches through.
#[async_trait]
pub trait PolicyGuard: Send + Sync {
    /// Runs the full VERIFY-BEFORE-ACT gate for `action`, including any
    /// required signature collection or critic review.
    ///
    /// # Errors
    /// Returns [`PolicyGuardError`] on a constitutional hash mismatch or a
    /// decider failure. A plain policy `deny` is returned as `Ok`, not an
    /// error — the caller inspects `GuardResult::is_allowed`.
    async fn verify(
        &self,
        agent_id: &AgentId,
        action: &GuardAction,
        context: &GuardContext,
        now: UtcInstant,
    ) -> Result<GuardResult, PolicyGuardError>;

    /// Opens a signature collection round for `decision_id` and waits for it
    /// to reach `threshold` or `timeout`, whichever comes first.
    ///
    /// # Errors
    /// Returns [`PolicyGuardError`] if the round cannot be opened.
    async fn collect_signatures(
        &self,
        decision_id: DecisionId,
        signers: Vec<AgentId>,
        threshold: usize,
        timeout: Duration,
        now: UtcInstant,
    ) -> Result<SignatureOutcome, PolicyGuardError>;

    /// Opens a critic review round for `decision_id` and waits for every
    /// invited critic to respond or for `timeout` to elapse.
    ///
    /// # Errors
    /// Returns [`PolicyGuardError`] if the round cannot be opened.
    async fn submit_for_review(
        &self,
        decision_id: DecisionId,
        reviewers: Vec<CriticId>,
        review_types: Vec<String>,
        timeout: Duration,
        now: UtcInstant,
    ) -> Result<ReviewOutcome, PolicyGuardError>;

    /// Registers a critic agent in the review pool.
    ///
    /// # Errors
    /// Returns [`PolicyGuardError::CriticAlreadyRegistered`] if already registered.
    fn register_critic(&self, registration: CriticRegistration) -> Result<(), PolicyGuardError>;

    /// Removes a critic from the review pool. Idempotent.
    fn unregister_critic(&self, critic_id: &CriticId);
}

/// Default [`PolicyGuard`]: validates the constitutional hash, defers policy
/// evaluation to an injected [`PolicyDecider`], and reuses the signature and
/// review collectors for anything beyond a plain allow/deny.
pub struct ConstitutionalPolicyGuard<D> {
    decider: D,
    signatures: SignatureCollector,
    reviews: ReviewCollector,
}

impl<D> ConstitutionalPolicyGuard<D> {
    /// Builds a guard around `decider`.
    #[must_use]
    pub fn new(decider: D) -> Self {
        Self { decider, signatures: SignatureCollector::new(), reviews: ReviewCollector::new() }
    }

    /// Submits a signer's already-verified signature toward an open
    /// signature collection round. Not part of the [`PolicyGuard`] capability
    /// interface: a host wires this to wherever external signers respond.
    ///
    /// # Errors
    /// Returns [`PolicyGuardError::UnknownDecision`] if no round is open.
    pub fn submit_signature(
        &self,
        decision_id: &DecisionId,
        signer: AgentId,
        signature_hex: String,
    ) -> Result<bool, PolicyGuardError> {
        self.signatures.submit(decision_id, signer, signature_hex)
    }

    /// Submits a critic's verdict toward an open review round. Not part of
    /// the [`PolicyGuard`] capability interface, for the same reason as
    /// [`Self::submit_signature`].
    ///
    /// # Errors
    /// Returns [`PolicyGuardError::UnknownDecision`] if no round is open.
    pub fn submit_review(&self, decision_id: &DecisionId, review: CriticReview) -> Result<bool, PolicyGuardError> {
        self.reviews.submit(decision_id, review)
    }
}

#[async_trait]
impl<D: PolicyDecider> PolicyGuard for ConstitutionalPolicyGuard<D> {
    async fn verify(
        &self,
        agent_id: &AgentId,
        action: &GuardAction,
        context: &GuardContext,
        now: UtcInstant,
    ) -> Result<GuardResult, PolicyGuardError> {
        if action.constitutional_hash != CONSTITUTIONAL_HASH {
            tracing::warn!(
                agent_id = agent_id.as_str(),
                actual_hash = action.constitutional_hash.as_str(),
                "rejected action with mismatched constitutional hash"
            );
            return Err(PolicyGuardError::ConstitutionalMismatch {
                expected: CONSTITUTIONAL_HASH,
                actual: action.constitutional_hash.clone(),
            });
        }

        let outcome = self
            .decider
            .decide(agent_id, action, context)
            .map_err(|err| PolicyGuardError::DeciderFailed(err.to_string()))?;

        match outcome.decision {
            PolicyDecision::Deny => {
                tracing::info!(agent_id = agent_id.as_str(), action_type = action.action_type.as_str(), "policy denied action");
                Ok(GuardResult::denied(outcome.policy_id, outcome.warnings))
            }
            PolicyDecision::Allow => Ok(GuardResult::allowed(outcome.policy_id, outcome.warnings)),
            PolicyDecision::RequireSignatures { signers, threshold } => {
                let decision_id = DecisionId::from(format!("{agent_id}:{}", action.action_type));
                let sig_outcome = self
                    .collect_signatures(
                        decision_id,
                        signers.clone(),
                        threshold,
                        Duration::seconds(300),
                        now,
                    )
                    .await?;
                Ok(GuardResult {
                    decision: GuardDecisionKind::RequireSignatures,
                    is_allowed: sig_outcome.is_valid,
                    policy_id: outcome.policy_id,
                    validation_errors: Vec::new(),
                    validation_warnings: outcome.warnings,
                    required_signers: signers,
                    required_reviewers: Vec::new(),
                    confidence: if sig_outcome.is_valid { 1.0 } else { 0.5 },
                })
            }
            PolicyDecision::RequireReview { reviewers, review_types } => {
                let decision_id = DecisionId::from(format!("{agent_id}:{}", action.action_type));
                let review_outcome = self
                    .submit_for_review(decision_id, reviewers.clone(), review_types, Duration::seconds(300), now)
                    .await?;
                let is_allowed = review_outcome.consensus == ConsensusVerdict::Approve;
                let confidence = match review_outcome.consensus {
                    ConsensusVerdict::Approve | ConsensusVerdict::Reject => 1.0,
                    ConsensusVerdict::Escalate => 0.5,
                };
                Ok(GuardResult {
                    decision: GuardDecisionKind::RequireReview,
                    is_allowed,
                    policy_id: outcome.policy_id,
                    validation_errors: Vec::new(),
                    validation_warnings: outcome.warnings,
                    required_signers: Vec::new(),
                    required_reviewers: reviewers,
                    confidence,
                })
            }
        }
    }

    async fn collect_signatures(
        &self,
        decision_id: DecisionId,
        signers: Vec<AgentId>,
        threshold: usize,
        timeout: Duration,
        now: UtcInstant,
    ) -> Result<SignatureOutcome, PolicyGuardError> {
        self.signatures.open(decision_id.clone(), signers, threshold, now + timeout);
        self.signatures.wait(&decision_id, now).await
    }

    async fn submit_for_review(
        &self,
        decision_id: DecisionId,
        reviewers: Vec<CriticId>,
        _review_types: Vec<String>,
        timeout: Duration,
        now: UtcInstant,
    ) -> Result<ReviewOutcome, PolicyGuardError> {
        self.reviews.open(decision_id.clone(), reviewers, now + timeout);
        self.reviews.wait(&decision_id, now).await
    }

    fn register_critic(&self, registration: CriticRegistration) -> Result<(), PolicyGuardError> {
        self.reviews.register_critic(registration)
    }

    fn unregister_critic(&self, critic_id: &CriticId) {
        self.reviews.unregister_critic(critic_id);
    }
}
