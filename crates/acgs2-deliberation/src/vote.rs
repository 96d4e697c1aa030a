// crates/acgs2-deliberation/src/vote.rs
// ============================================================================
// Module: Agent Votes
// Description: A single agent's vote in a multi-agent consensus round.
// ============================================================================

use acgs2_core::identifiers::AgentId;
use acgs2_core::UtcInstant;
use serde::Deserialize;
use serde::Serialize;

/// The three ways an agent can vote on a deliberation item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    /// The agent approves the message.
    Approve,
    /// The agent rejects the message.
    Reject,
    /// The agent declines to vote either way; does not count toward approval.
    Abstain,
}

/// A vote cast by one agent. Submitting a second vote for the same item
/// overwrites the agent's prior vote rather than adding another entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentVote {
    /// The voting agent.
    pub agent_id: AgentId,
    /// The vote cast.
    pub vote: VoteType,
    /// Free-text justification supplied by the agent.
    pub reasoning: String,
    /// The agent's self-reported confidence, `[0, 1]`.
    pub confidence: f64,
    /// When this vote (or its most recent overwrite) was cast.
    pub cast_at: UtcInstant,
}
