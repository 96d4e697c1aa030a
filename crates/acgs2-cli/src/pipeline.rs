// crates/acgs2-cli/src/pipeline.rs
// ============================================================================
// Module: Govern Pipeline
// Description: Wires the scorer, router, guard and audit ledger together for
//              the `govern` subcommand — one message through the full path.
// ============================================================================

use std::sync::Arc;

use acgs2_config::GovernanceConfig;
use acgs2_core::identifiers::AgentId;
use acgs2_core::identifiers::AuditEntryId;
use acgs2_core::identifiers::MessageId;
use acgs2_core::identifiers::TenantId;
use acgs2_core::ContentMap;
use acgs2_core::Message;
use acgs2_core::MessageType;
use acgs2_core::Priority;
use acgs2_core::UtcInstant;
use acgs2_deliberation::DeliberationQueue;
use acgs2_impact_scorer::ImpactScorer;
use acgs2_policy_guard::ConstitutionalPolicyGuard;
use acgs2_policy_guard::GuardAction;
use acgs2_policy_guard::GuardContext;
use acgs2_policy_guard::GuardResult;
use acgs2_policy_guard::PolicyGuard;
use acgs2_router::AdaptiveRouter;
use acgs2_router::Lane;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::decider::ThresholdDecider;

/// The CLI-facing request shape read from a `govern` input file. A thin
/// wrapper over `acgs2_core::Message`'s constructor arguments.
#[derive(Debug, Deserialize)]
pub struct GovernRequest {
    /// Sending agent id.
    pub from_agent: String,
    /// Receiving agent id.
    pub to_agent: String,
    /// Owning tenant id.
    pub tenant: String,
    /// Kind of message.
    pub message_type: MessageType,
    /// Priority band.
    pub priority: Priority,
    /// Arbitrary structured payload.
    pub content: Value,
}

/// What `run_govern_pipeline` reports back to the CLI caller.
#[derive(Debug, Serialize)]
pub struct GovernOutcome {
    /// The impact score the scorer assigned.
    pub impact_score: f64,
    /// Which lane the router sent the message down.
    pub lane: Lane,
    /// The guard's decision, present only when the message took the fast
    /// lane (a deliberation-bound message isn't gated until it resolves).
    pub guard_result: Option<GuardResult>,
}

/// Scores, routes, and — for fast-lane messages — gates `request` through the
/// policy guard, appending an audit entry for the routing decision.
///
/// # Errors
/// Returns a boxed error if the guard's constitutional check fails.
pub async fn run_govern_pipeline(
    config: &GovernanceConfig,
    request: GovernRequest,
) -> Result<GovernOutcome, Box<dyn std::error::Error>> {
    let scorer = Arc::new(ImpactScorer::new(config.scoring));
    let deliberation_timeout_secs = i64::try_from(config.router.deliberation_timeout_secs).unwrap_or(i64::MAX);
    let deliberation = Arc::new(DeliberationQueue::new(
        time::Duration::seconds(deliberation_timeout_secs),
        config.deliberation.consensus_threshold,
    ));
    let router = AdaptiveRouter::new(config.router, Arc::clone(&scorer), deliberation);

    let now = UtcInstant::now();
    let mut message = Message::new(
        MessageId::new(uuid_like(now)),
        AgentId::from(request.from_agent.as_str()),
        AgentId::from(request.to_agent.as_str()),
        TenantId::from(request.tenant.as_str()),
        ContentMap::from_value(request.content),
        request.message_type,
        request.priority,
    );

    let decision = router.route(&mut message, now);
    let impact_score = decision.impact_score;

    let guard_result = if decision.lane == Lane::Fast {
        let guard = ConstitutionalPolicyGuard::new(ThresholdDecider::new(config.router.impact_threshold));
        let action_type = serde_json::to_value(message.message_type)?
            .as_str()
            .unwrap_or("unknown")
            .to_owned();
        let action = GuardAction {
            action_type,
            content: message.content.as_map().clone().into(),
            impact_score,
            constitutional_hash: message.constitutional_hash.clone(),
        };
        let context = GuardContext {
            from_agent: message.from_agent.clone(),
            to_agent: Some(message.to_agent.clone()),
            tenant_id: message.tenant.clone(),
            priority: message.priority,
        };
        let result = guard.verify(&message.from_agent, &action, &context, now).await?;

        let outcome = serde_json::to_value(result.decision)?.as_str().unwrap_or("unknown").to_owned();
        let ledger = acgs2_audit::AuditLedger::new(acgs2_core::DEFAULT_HASH_ALGORITHM);
        ledger.append(
            AuditEntryId::new(uuid_like(now)),
            acgs2_audit::AuditEventType::PolicyDecision,
            message.from_agent.clone(),
            serde_json::to_value(&result)?,
            outcome,
            now,
        )?;
        Some(result)
    } else {
        None
    };

    Ok(GovernOutcome { impact_score, lane: decision.lane, guard_result })
}

/// A demo-only, non-cryptographic id derived from the current instant's Unix
/// nanoseconds. Good enough for a CLI's id fields; a real host assigns ids
/// upstream (e.g. from the inbound transport's own message id).
fn uuid_like(now: UtcInstant) -> String {
    format!("cli-{}", now.as_offset_date_time().unix_timestamp_nanos())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;

    #[tokio::test]
    async fn low_impact_request_takes_the_fast_lane_and_is_allowed() {
        let config = GovernanceConfig::default();
        let request = GovernRequest {
            from_agent: "agent-a".to_owned(),
            to_agent: "agent-b".to_owned(),
            tenant: "tenant-1".to_owned(),
            message_type: MessageType::Query,
            priority: Priority::Low,
            content: serde_json::json!({"text": "Hello, how are you today?"}),
        };
        let outcome = run_govern_pipeline(&config, request).await.expect("pipeline must succeed");
        assert_eq!(outcome.lane, Lane::Fast);
        let guard_result = outcome.guard_result.expect("fast lane must produce a guard result");
        assert!(guard_result.is_allowed);
    }
}
