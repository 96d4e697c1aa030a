// crates/acgs2-contract/src/tool_contract.rs
// ============================================================================
// Module: MCP Tool Contract
// Description: DTO + registry seam describing external MCP tools a host
//              exposes, for risk-scoring and audit purposes. No MCP server
//              lives here.
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::ContractError;

/// Describes one external MCP tool a host may route governed messages to.
///
/// `acgs2-impact-scorer`'s permission signal reads a tool's name out of the
/// message payload directly; this contract is the registration-time shape a
/// host uses to declare what a tool name means (so an unregistered tool name
/// can be flagged rather than silently scored as low-risk).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolContract {
    /// The tool name as it appears in a message's `tools[].name` field.
    pub name: String,
    /// Human-readable description shown in audit trails.
    pub description: String,
    /// JSON Schema describing the tool's input shape.
    pub input_schema: Value,
    /// Whether invoking this tool is inherently high-risk (e.g. admin/write
    /// access), independent of the message content around it.
    pub high_risk: bool,
}

/// Looks up registered [`McpToolContract`]s by name.
///
/// A real implementation backs this with whatever catalog a deployment uses
/// to onboard MCP tools (a config file, a service registry). Out of scope
/// here; this crate defines only the shape and a lookup seam.
pub trait ToolContractRegistry: Send + Sync {
    /// Returns the contract registered under `name`, if any.
    ///
    /// # Errors
    /// Returns [`ContractError::NotFound`] if no tool is registered under
    /// `name`.
    fn lookup(&self, name: &str) -> Result<McpToolContract, ContractError>;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    /// A fixed in-memory catalog, useful only for exercising
    /// [`ToolContractRegistry`] callers in tests.
    struct StaticToolContractRegistry {
        tools: HashMap<String, McpToolContract>,
    }

    impl ToolContractRegistry for StaticToolContractRegistry {
        fn lookup(&self, name: &str) -> Result<McpToolContract, ContractError> {
            self.tools.get(name).cloned().ok_or_else(|| ContractError::NotFound(name.to_owned()))
        }
    }

    #[test]
    fn lookup_returns_a_registered_tool() {
        let contract = McpToolContract {
            name: "admin_execute".to_owned(),
            description: "Executes an administrative command".to_owned(),
            input_schema: json!({"type": "object"}),
            high_risk: true,
        };
        let registry =
            StaticToolContractRegistry { tools: HashMap::from([(contract.name.clone(), contract.clone())]) };
        let looked_up = registry.lookup("admin_execute").expect("lookup must succeed");
        assert_eq!(looked_up, contract);
    }

    #[test]
    fn lookup_of_unregistered_tool_is_not_found() {
        let registry = StaticToolContractRegistry { tools: HashMap::new() };
        let err = registry.lookup("unknown_tool").expect_err("expected not-found");
        assert!(matches!(err, ContractError::NotFound(_)));
    }
}
