// crates/acgs2-cli/src/verify_policy.rs
// ============================================================================
// Module: Verify Policy Subcommand
// Description: Runs the Propose-Solve-Verify loop over a natural-language
//              specification read from the command line.
// ============================================================================

use acgs2_core::identifiers::SpecId;
use acgs2_core::UtcInstant;
use acgs2_policy_gen::PolicyGenError;
use acgs2_policy_gen::PolicyGenerator;
use acgs2_policy_gen::PolicySpecification;
use acgs2_policy_gen::SubprocessDafnyVerifier;
use acgs2_policy_gen::VerifiedPolicy;

/// Runs the bounded Propose-Solve-Verify loop over `natural_language`,
/// shelling out to `dafny_binary` if Dafny verification is requested.
///
/// # Errors
/// Returns [`PolicyGenError`] if the Dafny subprocess could not be invoked;
/// an unsatisfiable SMT encoding is reported as `VerifiedPolicy::failed`, not
/// an error.
pub async fn run_verify_policy(
    natural_language: &str,
    dafny_binary: &str,
    max_iterations: u32,
) -> Result<VerifiedPolicy, PolicyGenError> {
    let specification = PolicySpecification::new(SpecId::new("cli-spec"), natural_language);
    let verifier = SubprocessDafnyVerifier::new(dafny_binary);
    let generator = PolicyGenerator::new(acgs2_policy_gen::BuiltinSmtEngine, verifier, max_iterations);
    generator.generate_verified_policy(&specification, UtcInstant::now()).await
}
