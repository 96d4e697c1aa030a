// crates/acgs2-core/src/constitutional.rs
// ============================================================================
// Module: Constitutional Hash Invariant
// Description: The fixed reference hash every governance-relevant entity carries.
// Purpose: Fail closed against cross-version or adversarial injection.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Every entity that participates in governance (messages, policy specs, bundle
//! manifests, generated policy sources) embeds this literal. A mismatch anywhere
//! is a [`ConstitutionalViolation`](crate::error::GovernanceError::ConstitutionalViolation),
//! never a soft warning.

/// Fixed 16-hex constitutional hash every governance entity must carry.
pub const CONSTITUTIONAL_HASH: &str = "cdd01ef066bc6cf2";

/// Checks a candidate hash against [`CONSTITUTIONAL_HASH`].
///
/// Returns `Ok(())` on an exact match, `Err(candidate)` otherwise so callers can
/// build a typed, fail-closed error with the offending value attached.
///
/// # Errors
///
/// Returns the mismatched hash (owned) when `candidate` does not equal
/// [`CONSTITUTIONAL_HASH`].
pub fn verify_constitutional_hash(candidate: &str) -> Result<(), String> {
    if candidate == CONSTITUTIONAL_HASH {
        Ok(())
    } else {
        Err(candidate.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_match() {
        assert!(verify_constitutional_hash(CONSTITUTIONAL_HASH).is_ok());
    }

    #[test]
    fn rejects_any_other_value() {
        let err = verify_constitutional_hash("wrong-hash").expect_err("should mismatch");
        assert_eq!(err, "wrong-hash");
    }
}
