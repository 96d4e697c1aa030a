// crates/acgs2-router/src/lib.rs
// ============================================================================
// Crate: acgs2-router
// Description: C2 — adaptive dual-path routing between the fast lane and the
//              deliberation queue.
// ============================================================================

//! ## Overview
//! Scores every message through `acgs2-impact-scorer`, then routes it to the
//! fast lane or to `acgs2-deliberation` depending on whether the score meets
//! the current impact threshold. The threshold itself adapts over time from
//! reported outcome feedback (see [`router::AdaptiveRouter::update_performance_feedback`]).

pub mod config;
pub mod decision;
pub mod history;
pub mod router;

pub use config::RouterConfig;
pub use decision::FeedbackOutcome;
pub use decision::Lane;
pub use decision::RoutingDecision;
pub use history::PerformanceMetrics;
pub use router::AdaptiveRouter;
