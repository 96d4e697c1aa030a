// crates/acgs2-deliberation/src/status.rs
// ============================================================================
// Module: Deliberation Status
// Description: Lifecycle states of a deliberation item.
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// Lifecycle state of a [`crate::item::DeliberationItem`].
///
/// `Pending` is transient: items move to `UnderReview` as soon as they are
/// enqueued (the original source never performed this transition, leaving
/// human decisions permanently rejected — see `DESIGN.md`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliberationStatus {
    /// Enqueued, not yet open for review or voting.
    Pending,
    /// Open for human review and/or agent voting.
    UnderReview,
    /// Terminal: a human reviewer approved the message.
    Approved,
    /// Terminal: a human reviewer rejected the message.
    Rejected,
    /// Terminal: the deliberation deadline elapsed with no resolution.
    TimedOut,
    /// Terminal: multi-agent voting reached the consensus threshold.
    ConsensusReached,
}

impl DeliberationStatus {
    /// Returns whether this status is a terminal outcome.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::UnderReview)
    }

    /// Returns whether this terminal status counts as message approval.
    #[must_use]
    pub const fn is_approval(self) -> bool {
        matches!(self, Self::Approved | Self::ConsensusReached)
    }
}
