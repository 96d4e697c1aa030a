// crates/acgs2-policy-gen/src/lib.rs
// ============================================================================
// Crate: acgs2-policy-gen
// Description: C6 — the bounded Propose-Solve-Verify loop producing SMT- and
//              Dafny-verified policies.
// ============================================================================

//! ## Overview
//! [`generator::PolicyGenerator`] drives the loop: [`rego::generate_rego`] and
//! [`smt::generate_smt`] translate a [`spec::PolicySpecification`] by keyword
//! heuristics, [`smt::SmtEngine`] checks the SMT-LIB2 encoding in-process, and
//! [`verifier::FormalVerifier`] shells out to an external Dafny-compatible
//! binary. Neither seam links an actual solver or verifier; the built-in SMT
//! engine and the subprocess verifier are the default wiring, not the only
//! possible one.

pub mod dafny;
pub mod error;
pub mod generator;
pub mod rego;
pub mod result;
pub mod smt;
pub mod spec;
pub mod verifier;

pub use dafny::generate_dafny;
pub use error::PolicyGenError;
pub use generator::PolicyGenerator;
pub use generator::DEFAULT_MAX_ITERATIONS;
pub use rego::generate_rego;
pub use result::PsvIteration;
pub use result::VerificationStatus;
pub use result::VerifiedPolicy;
pub use smt::generate_smt;
pub use smt::BuiltinSmtEngine;
pub use smt::SmtCheckResult;
pub use smt::SmtEngine;
pub use smt::SmtStatus;
pub use spec::PolicySpecification;
pub use verifier::DafnyCheckResult;
pub use verifier::DafnyStatus;
pub use verifier::FormalVerifier;
pub use verifier::SubprocessDafnyVerifier;
pub use verifier::DEFAULT_VERIFIER_TIMEOUT;
