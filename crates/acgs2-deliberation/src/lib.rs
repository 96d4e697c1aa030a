// crates/acgs2-deliberation/src/lib.rs
// ============================================================================
// Crate: acgs2-deliberation
// Description: C3 — human-in-the-loop and multi-agent consensus for
//              high-impact messages.
// ============================================================================

//! ## Overview
//! Messages routed to deliberation (see `acgs2-router`) are enqueued here as
//! [`item::DeliberationItem`]s. Resolution — a human decision, agent
//! consensus, or timeout — is delivered through `tokio::sync::Notify` rather
//! than polled, so callers `.await` a single future instead of spinning.

pub mod error;
pub mod item;
pub mod queue;
pub mod status;
pub mod vote;

pub use error::DeliberationError;
pub use item::DeliberationItem;
pub use queue::DeliberationQueue;
pub use queue::QueueStats;
pub use status::DeliberationStatus;
pub use vote::AgentVote;
pub use vote::VoteType;
