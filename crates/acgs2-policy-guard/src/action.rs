// crates/acgs2-policy-guard/src/action.rs
// ============================================================================
// Module: Guard Action & Context
// Description: The input shape a `PolicyDecider` evaluates, per the policy
//              evaluation contract.
// ============================================================================

use acgs2_core::identifiers::AgentId;
use acgs2_core::identifiers::TenantId;
use acgs2_core::Priority;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// The proposed action a `verify` call is gating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardAction {
    /// A short label for the kind of action being proposed.
    pub action_type: String,
    /// Arbitrary action payload the decider may inspect.
    pub content: Value,
    /// The impact score computed upstream by `acgs2-impact-scorer`.
    pub impact_score: f64,
    /// The constitutional hash the caller attached to this action.
    pub constitutional_hash: String,
}

/// Ambient context the action is proposed within.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardContext {
    /// The agent originating the action.
    pub from_agent: AgentId,
    /// The agent the action targets, if any.
    pub to_agent: Option<AgentId>,
    /// The tenant this action is scoped to.
    pub tenant_id: TenantId,
    /// The action's priority.
    pub priority: Priority,
}
