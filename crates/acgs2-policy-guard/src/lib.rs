// crates/acgs2-policy-guard/src/lib.rs
// ============================================================================
// Crate: acgs2-policy-guard
// Description: C5 — the VERIFY-BEFORE-ACT gate: constitutional hash check,
//              policy evaluation, signature collection, critic review.
// ============================================================================

//! ## Overview
//! [`guard::PolicyGuard`] collapses what the original source split across a
//! mixin hierarchy into one capability trait. [`guard::ConstitutionalPolicyGuard`]
//! validates the constitutional hash, defers the actual allow/deny/require_*
//! decision to an injected [`decision::PolicyDecider`], and — for the
//! `require_signatures`/`require_review` branches — reuses the same
//! resolved-signal pattern `acgs2-deliberation` uses instead of polling.

pub mod action;
pub mod decision;
pub mod error;
pub mod guard;
pub mod result;
pub mod review;
pub mod signature;

pub use action::GuardAction;
pub use action::GuardContext;
pub use decision::PolicyDecider;
pub use decision::PolicyDecision;
pub use decision::PolicyError;
pub use decision::PolicyOutcome;
pub use error::PolicyGuardError;
pub use guard::ConstitutionalPolicyGuard;
pub use guard::PolicyGuard;
pub use result::GuardDecisionKind;
pub use result::GuardResult;
pub use review::ConsensusVerdict;
pub use review::CriticRegistration;
pub use review::CriticReview;
pub use review::ReviewCollector;
pub use review::ReviewOutcome;
pub use review::ReviewVerdict;
pub use signature::verify_signature_hex;
pub use signature::AcceptedSignature;
pub use signature::SignatureCollector;
pub use signature::SignatureOutcome;
