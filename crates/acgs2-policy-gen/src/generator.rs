// crates/acgs2-policy-gen/src/generator.rs
// ============================================================================
// Module: Policy Generator
// Description: The bounded Propose-Solve-Verify loop tying the translator,
//              SMT engine, and formal verifier together.
// ============================================================================

use acgs2_core::identifiers::PolicyId;
use acgs2_core::UtcInstant;

use crate::dafny::generate_dafny;
use crate::error::PolicyGenError;
use crate::rego::generate_rego;
use crate::result::PsvIteration;
use crate::result::VerifiedPolicy;
use crate::smt::generate_smt;
use crate::smt::BuiltinSmtEngine;
use crate::smt::SmtCheckResult;
use crate::smt::SmtEngine;
use crate::smt::SmtStatus;
use crate::spec::PolicySpecification;
use crate::verifier::DafnyStatus;
use crate::verifier::FormalVerifier;

/// Default bound on Propose-Solve-Verify iterations per spec §4.6.
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;

/// Runs the bounded Propose-Solve-Verify loop for [`PolicySpecification`]s.
pub struct PolicyGenerator<S: SmtEngine, V: FormalVerifier> {
    smt_engine: S,
    verifier: V,
    max_iterations: u32,
}

impl<V: FormalVerifier> PolicyGenerator<BuiltinSmtEngine, V> {
    /// Builds a generator using the built-in SMT engine and the given formal
    /// verifier, with the default `max_iterations` of 5.
    #[must_use]
    pub fn with_builtin_smt_engine(verifier: V) -> Self {
        Self { smt_engine: BuiltinSmtEngine, verifier, max_iterations: DEFAULT_MAX_ITERATIONS }
    }
}

impl<S: SmtEngine, V: FormalVerifier> PolicyGenerator<S, V> {
    /// Builds a generator from explicit engine/verifier implementations.
    #[must_use]
    pub fn new(smt_engine: S, verifier: V, max_iterations: u32) -> Self {
        Self { smt_engine, verifier, max_iterations }
    }

    /// Runs the Propose-Solve-Verify loop for `specification`, stopping at
    /// the first iteration whose SMT encoding is satisfiable, or returning a
    /// `failed` policy once `max_iterations` is exhausted.
    ///
    /// # Errors
    /// Returns [`PolicyGenError`] only if the formal verifier itself could
    /// not be invoked; an unsatisfiable or undecidable SMT result is not an
    /// error, it drives the loop to the next iteration or the failed result.
    pub async fn generate_verified_policy(
        &self,
        specification: &PolicySpecification,
        now: UtcInstant,
    ) -> Result<VerifiedPolicy, PolicyGenError> {
        let mut transcript = Vec::new();
        let mut last_smt_result = None;

        for iteration in 1..=self.max_iterations {
            let working_spec = propose(specification, iteration);
            let rego = generate_rego(&working_spec);
            let smt_encoding = generate_smt(&working_spec);
            let smt_result = self.smt_engine.check(&smt_encoding);
            let dafny = generate_dafny(&working_spec, &rego);

            let success = smt_result.status == SmtStatus::Sat;
            if !success {
                transcript.push(PsvIteration {
                    iteration_number: iteration,
                    proposed_text: working_spec.natural_language.clone(),
                    success: false,
                    proven: false,
                });
                last_smt_result = Some(smt_result);
                continue;
            }

            let dafny_result = self.verifier.verify(&dafny).await?;
            let proven = dafny_result.status == DafnyStatus::Verified;
            transcript.push(PsvIteration {
                iteration_number: iteration,
                proposed_text: working_spec.natural_language.clone(),
                success: true,
                proven,
            });

            let policy_id = PolicyId::from(format!("pol_{}", short_uuid()));
            tracing::info!(
                policy_id = policy_id.as_str(),
                spec_id = specification.spec_id.as_str(),
                iteration,
                proven,
                "generated verified policy"
            );
            return Ok(VerifiedPolicy::succeeded(
                policy_id,
                specification.clone(),
                rego,
                dafny,
                smt_encoding,
                &smt_result,
                &dafny_result,
                transcript,
                now,
            ));
        }

        let last_smt_result = last_smt_result.unwrap_or(SmtCheckResult {
            status: SmtStatus::Unknown,
            model: None,
            reason: Some("no iteration ran".to_owned()),
        });
        tracing::warn!(
            spec_id = specification.spec_id.as_str(),
            max_iterations = self.max_iterations,
            "exhausted propose-solve-verify iterations without a satisfiable encoding"
        );
        Ok(VerifiedPolicy::failed(specification.clone(), &last_smt_result, transcript, now))
    }
}

/// Returns the first 8 hex characters of a freshly generated UUID v4, used as
/// the short, human-pastable suffix on generated policy ids.
fn short_uuid() -> String {
    uuid::Uuid::new_v4().simple().to_string().chars().take(8).collect()
}

/// The propose stage: expands `specification`'s natural language with an
/// additional constraint on every retry, carrying the expansion into the
/// audit trail even when it does not change the solver's verdict.
fn propose(specification: &PolicySpecification, iteration: u32) -> PolicySpecification {
    if iteration <= 1 {
        specification.clone()
    } else {
        specification.with_expanded_text(&format!(
            "Additional constraint: enforce stricter verification after {} prior attempt(s).",
            iteration - 1
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use acgs2_core::identifiers::SpecId;
    use async_trait::async_trait;

    use super::*;
    use crate::verifier::DafnyCheckResult;

    struct FakeVerifier {
        status: DafnyStatus,
    }

    #[async_trait]
    impl FormalVerifier for FakeVerifier {
        async fn verify(&self, _dafny_code: &str) -> Result<DafnyCheckResult, PolicyGenError> {
            Ok(DafnyCheckResult {
                status: self.status.clone(),
                stdout: String::new(),
                stderr: String::new(),
                exit_code: Some(0),
            })
        }
    }

    #[tokio::test]
    async fn ordinary_specification_proves_on_the_first_iteration() {
        let generator = PolicyGenerator::with_builtin_smt_engine(FakeVerifier { status: DafnyStatus::Verified });
        let spec = PolicySpecification::new(SpecId::from("s1"), "Admins can read and write, but users can only read.");
        let policy = generator.generate_verified_policy(&spec, UtcInstant::now()).await.expect("generates");
        assert_eq!(policy.iterations, 1);
        assert!(policy.rego_policy.contains("package constitutional"));
        assert!((policy.confidence_score - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn unverified_dafny_yields_verified_not_proven() {
        let generator = PolicyGenerator::with_builtin_smt_engine(FakeVerifier { status: DafnyStatus::Failed });
        let spec = PolicySpecification::new(SpecId::from("s2"), "Allow owners to delete their resources.");
        let policy = generator.generate_verified_policy(&spec, UtcInstant::now()).await.expect("generates");
        assert!((policy.confidence_score - 0.8).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn contradictory_specification_exhausts_iterations_and_fails() {
        let generator = PolicyGenerator::new(BuiltinSmtEngine, FakeVerifier { status: DafnyStatus::Verified }, 3);
        let spec = PolicySpecification::new(SpecId::from("s3"), "A contradictory and impossible policy.");
        let policy = generator.generate_verified_policy(&spec, UtcInstant::now()).await.expect("generates");
        assert_eq!(policy.iterations, 3);
        assert!((policy.confidence_score - 0.5).abs() < f64::EPSILON);
    }
}
