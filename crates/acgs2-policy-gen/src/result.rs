// crates/acgs2-policy-gen/src/result.rs
// ============================================================================
// Module: Verified Policy Result
// Description: The Propose-Solve-Verify loop's output type and per-iteration
//              audit trail.
// ============================================================================

use acgs2_core::identifiers::PolicyId;
use acgs2_core::UtcInstant;
use acgs2_core::CONSTITUTIONAL_HASH;
use serde::Deserialize;
use serde::Serialize;

use crate::dafny::generate_dafny;
use crate::rego::generate_rego;
use crate::smt::generate_smt;
use crate::smt::SmtCheckResult;
use crate::smt::SmtStatus;
use crate::spec::PolicySpecification;
use crate::verifier::DafnyCheckResult;
use crate::verifier::DafnyStatus;

/// Status a [`VerifiedPolicy`] can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// The SMT check was satisfiable but Dafny did not verify.
    Verified,
    /// Both the SMT check and the Dafny verifier succeeded.
    Proven,
    /// No iteration produced a satisfiable encoding within `max_iterations`.
    Failed,
}

/// One iteration of the Propose-Solve-Verify loop, kept for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsvIteration {
    /// 1-based iteration number.
    pub iteration_number: u32,
    /// The natural-language text this iteration actually solved against,
    /// after the propose stage's expansion.
    pub proposed_text: String,
    /// Whether this iteration's SMT check was satisfiable.
    pub success: bool,
    /// Whether this iteration's Dafny check also verified.
    pub proven: bool,
}

/// A policy produced by the Propose-Solve-Verify loop, carrying every source
/// representation and the full verification transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedPolicy {
    /// Identity of this generated policy.
    pub policy_id: PolicyId,
    /// The specification this policy was generated from.
    pub specification: PolicySpecification,
    /// The generated Rego-like policy text.
    pub rego_policy: String,
    /// The generated Dafny formal specification.
    pub dafny_spec: String,
    /// The generated SMT-LIB2 encoding.
    pub smt_formulation: String,
    /// The SMT check transcript (status, model, reason).
    pub smt_status: String,
    /// The Dafny verifier transcript status (`verified | failed | error`).
    pub dafny_status: String,
    /// Captured Dafny verifier stdout.
    pub dafny_stdout: String,
    /// Captured Dafny verifier stderr.
    pub dafny_stderr: String,
    /// Number of Propose-Solve-Verify iterations the generator ran.
    pub iterations: u32,
    /// Per-iteration audit trail: the propose-stage text and outcome of
    /// every attempt, including ones that did not reach satisfiability.
    pub transcript: Vec<PsvIteration>,
    /// Reached status.
    pub verification_status: VerificationStatus,
    /// Confidence in this result: proven → 1.0, verified-only → 0.8, failed → 0.5.
    pub confidence_score: f64,
    /// When this policy was generated.
    pub created_at: UtcInstant,
    /// The constitutional hash embedded in every generated source.
    pub constitutional_hash: String,
}

impl VerifiedPolicy {
    /// Builds the successful result of an iteration whose SMT check was
    /// satisfiable, scoring confidence per whether Dafny also verified.
    #[must_use]
    #[allow(clippy::too_many_arguments, reason = "mirrors the PSV loop's single success path")]
    pub fn succeeded(
        policy_id: PolicyId,
        specification: PolicySpecification,
        rego_policy: String,
        dafny_spec: String,
        smt_formulation: String,
        smt_result: &SmtCheckResult,
        dafny_result: &DafnyCheckResult,
        transcript: Vec<PsvIteration>,
        now: UtcInstant,
    ) -> Self {
        let proven = dafny_result.status == DafnyStatus::Verified;
        let iterations = u32::try_from(transcript.len()).unwrap_or(u32::MAX);
        Self {
            policy_id,
            specification,
            rego_policy,
            dafny_spec,
            smt_formulation,
            smt_status: smt_result.status.as_str().to_owned(),
            dafny_status: dafny_result.status.as_str().to_owned(),
            dafny_stdout: dafny_result.stdout.clone(),
            dafny_stderr: dafny_result.stderr.clone(),
            iterations,
            transcript,
            verification_status: if proven { VerificationStatus::Proven } else { VerificationStatus::Verified },
            confidence_score: if proven { 1.0 } else { 0.8 },
            created_at: now,
            constitutional_hash: CONSTITUTIONAL_HASH.to_owned(),
        }
    }

    /// Builds the terminal `failed` result once `max_iterations` is exhausted
    /// without a satisfiable SMT encoding. The last iteration's source texts
    /// and transcript are retained so the failure is inspectable.
    #[must_use]
    pub fn failed(
        specification: PolicySpecification,
        last_smt_result: &SmtCheckResult,
        transcript: Vec<PsvIteration>,
        now: UtcInstant,
    ) -> Self {
        let rego_policy = generate_rego(&specification);
        let smt_formulation = generate_smt(&specification);
        let dafny_spec = generate_dafny(&specification, &rego_policy);
        let iterations = u32::try_from(transcript.len()).unwrap_or(u32::MAX);
        Self {
            policy_id: PolicyId::from(format!("failed_{}", specification.spec_id.as_str())),
            specification,
            rego_policy,
            dafny_spec,
            smt_formulation,
            smt_status: last_smt_result.status.as_str().to_owned(),
            dafny_status: "error".to_owned(),
            dafny_stdout: String::new(),
            dafny_stderr: last_smt_result.reason.clone().unwrap_or_default(),
            iterations,
            transcript,
            verification_status: VerificationStatus::Failed,
            confidence_score: 0.5,
            created_at: now,
            constitutional_hash: CONSTITUTIONAL_HASH.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use acgs2_core::identifiers::SpecId;

    use super::*;

    #[test]
    fn failed_result_carries_a_half_confidence_score() {
        let spec = PolicySpecification::new(SpecId::from("s1"), "A contradictory and impossible policy.");
        let smt_result = SmtCheckResult { status: SmtStatus::Unsat, model: None, reason: None };
        let transcript = vec![PsvIteration {
            iteration_number: 1,
            proposed_text: "A contradictory and impossible policy.".to_owned(),
            success: false,
            proven: false,
        }];
        let policy = VerifiedPolicy::failed(spec, &smt_result, transcript, UtcInstant::now());
        assert_eq!(policy.verification_status, VerificationStatus::Failed);
        assert!((policy.confidence_score - 0.5).abs() < f64::EPSILON);
        assert!(policy.policy_id.as_str().starts_with("failed_"));
        assert_eq!(policy.iterations, 1);
    }
}
