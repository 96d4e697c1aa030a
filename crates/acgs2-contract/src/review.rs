// crates/acgs2-contract/src/review.rs
// ============================================================================
// Module: Review Channel Seam
// Description: Trait boundary for routing a deliberation item to a human
//              reviewer (chat, ticketing, email). No transport lives here.
// ============================================================================

use async_trait::async_trait;

use crate::error::ContractError;

/// A request sent to a human reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    /// The deliberation item awaiting a human decision.
    pub item_id: String,
    /// Human-readable summary shown to the reviewer.
    pub summary: String,
}

/// A human reviewer's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// The reviewer approved the request.
    Approve,
    /// The reviewer rejected the request.
    Reject,
}

/// Notifies a human reviewer and returns their decision.
///
/// `acgs2-deliberation` decides *when* a human is needed; how that request
/// reaches a person (Slack, PagerDuty, email) is out of scope here and left
/// to a host-supplied implementation.
#[async_trait]
pub trait ReviewChannel: Send + Sync {
    /// Submits `request` for human review and waits for a decision.
    ///
    /// # Errors
    /// Returns [`ContractError::Unavailable`] if the channel cannot be
    /// reached.
    async fn submit_for_review(&self, request: &ReviewRequest) -> Result<ReviewDecision, ContractError>;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;

    /// Always approves, useful only for exercising [`ReviewChannel`] callers
    /// in tests without a real reviewer.
    #[derive(Debug, Default, Clone, Copy)]
    struct AutoApproveReviewChannel;

    #[async_trait]
    impl ReviewChannel for AutoApproveReviewChannel {
        async fn submit_for_review(&self, _request: &ReviewRequest) -> Result<ReviewDecision, ContractError> {
            Ok(ReviewDecision::Approve)
        }
    }

    #[tokio::test]
    async fn auto_approve_channel_always_approves() {
        let channel = AutoApproveReviewChannel;
        let request = ReviewRequest { item_id: "item-1".to_owned(), summary: "needs a human look".to_owned() };
        let decision = channel.submit_for_review(&request).await.expect("submit must succeed");
        assert_eq!(decision, ReviewDecision::Approve);
    }
}
