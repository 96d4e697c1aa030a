// crates/acgs2-policy-guard/src/signature.rs
// ============================================================================
// Module: Signature Collector
// Description: `collect_signatures` — event-driven collection of Ed25519
//              signatures toward a threshold, reusing the deliberation
//              queue's resolved-signal-over-polling pattern.
// ============================================================================

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration as StdDuration;

use acgs2_core::identifiers::AgentId;
use acgs2_core::identifiers::DecisionId;
use acgs2_core::UtcInstant;
use ed25519_dalek::Signature;
use ed25519_dalek::Verifier;
use ed25519_dalek::VerifyingKey;
use tokio::sync::Notify;

use crate::error::PolicyGuardError;

/// A signature accepted toward a decision's threshold.
#[derive(Debug, Clone)]
pub struct AcceptedSignature {
    /// The signing agent.
    pub signer: AgentId,
    /// The signature, hex-encoded, retained for audit purposes.
    pub signature_hex: String,
}

/// The result of waiting out a signature collection round.
#[derive(Debug, Clone)]
pub struct SignatureOutcome {
    /// `true` iff the threshold was met before the deadline.
    pub is_valid: bool,
    /// Signatures accepted, in submission order.
    pub signatures: Vec<AcceptedSignature>,
}

struct PendingState {
    collected: HashMap<AgentId, AcceptedSignature>,
    order: Vec<AgentId>,
    resolved: bool,
}

/// A single decision's in-flight signature collection.
struct PendingSignatures {
    eligible_signers: HashSet<AgentId>,
    threshold: usize,
    deadline: UtcInstant,
    state: Mutex<PendingState>,
    notify: Notify,
}

impl PendingSignatures {
    /// Opens a round awaiting `threshold` signatures from `signers`.
    fn new(signers: Vec<AgentId>, threshold: usize, deadline: UtcInstant) -> Self {
        Self {
            eligible_signers: signers.into_iter().collect(),
            threshold,
            deadline,
            state: Mutex::new(PendingState {
                collected: HashMap::new(),
                order: Vec::new(),
                resolved: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Locks the interior state, recovering from poisoning.
    fn locked(&self) -> MutexGuard<'_, PendingState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Records `signer`'s signature, returning `true` if it brought the round
    /// to threshold. Submitting twice for the same signer overwrites the
    /// prior signature without double-counting toward the threshold.
    fn accept(&self, signer: AgentId, signature_hex: String) -> bool {
        if !self.eligible_signers.contains(&signer) {
            return false;
        }
        let mut state = self.locked();
        if state.resolved {
            return false;
        }
        if !state.collected.contains_key(&signer) {
            state.order.push(signer.clone());
        }
        state.collected.insert(signer.clone(), AcceptedSignature { signer, signature_hex });

        if state.collected.len() >= self.threshold {
            state.resolved = true;
            drop(state);
            self.notify.notify_waiters();
            true
        } else {
            false
        }
    }

    /// Waits for this round to reach threshold or for `now` to pass its deadline.
    async fn wait(&self, now: UtcInstant) -> SignatureOutcome {
        let notified = self.notify.notified();
        tokio::pin!(notified);

        if self.locked().resolved {
            return self.outcome();
        }

        let remaining = self.deadline.elapsed_since(now);
        let budget =
            StdDuration::new(u64::try_from(remaining.whole_seconds().max(0)).unwrap_or(u64::MAX), 0);

        match tokio::time::timeout(budget, notified).await {
            Ok(()) => self.outcome(),
            Err(_) => self.outcome(),
        }
    }

    /// Snapshots the current outcome without waiting.
    fn outcome(&self) -> SignatureOutcome {
        let state = self.locked();
        SignatureOutcome {
            is_valid: state.collected.len() >= self.threshold,
            signatures: state.order.iter().filter_map(|id| state.collected.get(id)).cloned().collect(),
        }
    }
}

/// Verifies `signature_hex` (a hex-encoded Ed25519 signature) over `message`
/// using `public_key_hex` (a hex-encoded 32-byte Ed25519 verifying key).
///
/// # Errors
/// Returns [`PolicyGuardError::DeciderFailed`] if either hex value is
/// malformed, wrong-sized, or the signature does not verify.
pub fn verify_signature_hex(
    public_key_hex: &str,
    signature_hex: &str,
    message: &[u8],
) -> Result<(), PolicyGuardError> {
    let key_bytes = hex_decode(public_key_hex)
        .and_then(|bytes| <[u8; 32]>::try_from(bytes).map_err(|_| "public key must be 32 bytes".to_owned()))
        .map_err(PolicyGuardError::DeciderFailed)?;
    let sig_bytes = hex_decode(signature_hex)
        .and_then(|bytes| <[u8; 64]>::try_from(bytes).map_err(|_| "signature must be 64 bytes".to_owned()))
        .map_err(PolicyGuardError::DeciderFailed)?;

    let verifying_key =
        VerifyingKey::from_bytes(&key_bytes).map_err(|err| PolicyGuardError::DeciderFailed(err.to_string()))?;
    let signature = Signature::from_bytes(&sig_bytes);
    verifying_key
        .verify(message, &signature)
        .map_err(|err| PolicyGuardError::DeciderFailed(format!("signature verification failed: {err}")))
}

/// Decodes a hex string into bytes.
fn hex_decode(value: &str) -> Result<Vec<u8>, String> {
    if value.len() % 2 != 0 {
        return Err("hex string has odd length".to_owned());
    }
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&value[i..i + 2], 16).map_err(|err| err.to_string()))
        .collect()
}

/// Owns every in-flight signature collection round, keyed by decision id.
#[derive(Default)]
pub struct SignatureCollector {
    pending: Mutex<HashMap<DecisionId, Arc<PendingSignatures>>>,
}

impl SignatureCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new signature collection round for `decision_id`.
    pub fn open(&self, decision_id: DecisionId, signers: Vec<AgentId>, threshold: usize, deadline: UtcInstant) {
        tracing::info!(
            decision_id = decision_id.as_str(),
            signers = signers.len(),
            threshold,
            "opened signature collection round"
        );
        let round = Arc::new(PendingSignatures::new(signers, threshold, deadline));
        self.locked().insert(decision_id, round);
    }

    /// Submits `signer`'s pre-verified signature toward `decision_id`'s
    /// threshold. The caller is expected to have called
    /// [`verify_signature_hex`] first.
    ///
    /// # Errors
    /// Returns [`PolicyGuardError::UnknownDecision`] if no round is open.
    pub fn submit(
        &self,
        decision_id: &DecisionId,
        signer: AgentId,
        signature_hex: String,
    ) -> Result<bool, PolicyGuardError> {
        let round = self
            .locked()
            .get(decision_id)
            .cloned()
            .ok_or_else(|| PolicyGuardError::UnknownDecision(decision_id.clone()))?;
        Ok(round.accept(signer, signature_hex))
    }

    /// Waits for `decision_id`'s round to reach threshold or its deadline.
    ///
    /// # Errors
    /// Returns [`PolicyGuardError::UnknownDecision`] if no round is open.
    pub async fn wait(&self, decision_id: &DecisionId, now: UtcInstant) -> Result<SignatureOutcome, PolicyGuardError> {
        let round = self
            .locked()
            .get(decision_id)
            .cloned()
            .ok_or_else(|| PolicyGuardError::UnknownDecision(decision_id.clone()))?;
        Ok(round.wait(now).await)
    }

    /// Locks the pending-round table, recovering from poisoning.
    fn locked(&self) -> MutexGuard<'_, HashMap<DecisionId, Arc<PendingSignatures>>> {
        self.pending.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use ed25519_dalek::Signer;
    use ed25519_dalek::SigningKey;
    use time::Duration;

    use super::*;

    fn hex_encode(bytes: &[u8]) -> String {
        bytes.iter().map(|byte| format!("{byte:02x}")).collect()
    }

    #[test]
    fn signature_round_trips_through_hex_verification() {
        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        let message = b"decision-1";
        let signature = signing_key.sign(message);

        let public_hex = hex_encode(signing_key.verifying_key().as_bytes());
        let sig_hex = hex_encode(&signature.to_bytes());
        verify_signature_hex(&public_hex, &sig_hex, message).expect("valid signature verifies");
    }

    #[test]
    fn tampered_message_fails_verification() {
        let signing_key = SigningKey::from_bytes(&[9u8; 32]);
        let signature = signing_key.sign(b"decision-1");
        let public_hex = hex_encode(signing_key.verifying_key().as_bytes());
        let sig_hex = hex_encode(&signature.to_bytes());
        assert!(verify_signature_hex(&public_hex, &sig_hex, b"decision-2").is_err());
    }

    #[tokio::test]
    async fn threshold_resolves_once_enough_signers_submit() {
        let collector = SignatureCollector::new();
        let decision_id = DecisionId::from("d1");
        let now = UtcInstant::now();
        collector.open(
            decision_id.clone(),
            vec![AgentId::from("a"), AgentId::from("b"), AgentId::from("c")],
            2,
            now + Duration::seconds(60),
        );

        assert!(!collector.submit(&decision_id, AgentId::from("a"), "sig-a".into()).expect("open"));
        assert!(collector.submit(&decision_id, AgentId::from("b"), "sig-b".into()).expect("open"));

        let outcome = collector.wait(&decision_id, now).await.expect("open");
        assert!(outcome.is_valid);
        assert_eq!(outcome.signatures.len(), 2);
    }

    #[tokio::test]
    async fn ineligible_signer_does_not_count() {
        let collector = SignatureCollector::new();
        let decision_id = DecisionId::from("d2");
        let now = UtcInstant::now();
        collector.open(decision_id.clone(), vec![AgentId::from("a")], 1, now + Duration::seconds(60));

        assert!(!collector.submit(&decision_id, AgentId::from("intruder"), "sig".into()).expect("open"));
        let outcome = collector.wait(&decision_id, now).await.expect("open");
        assert!(!outcome.is_valid);
    }

    #[tokio::test]
    async fn unmet_threshold_times_out_as_invalid() {
        let collector = SignatureCollector::new();
        let decision_id = DecisionId::from("d3");
        let now = UtcInstant::now();
        collector.open(decision_id.clone(), vec![AgentId::from("a"), AgentId::from("b")], 2, now + Duration::seconds(300));

        collector.submit(&decision_id, AgentId::from("a"), "sig-a".into()).expect("open");
        let past_deadline = now + Duration::seconds(301);
        let outcome = collector.wait(&decision_id, past_deadline).await.expect("open");
        assert!(!outcome.is_valid);
        assert_eq!(outcome.signatures.len(), 1);
    }
}
