// crates/acgs2-contract/src/lib.rs
// ============================================================================
// Crate: acgs2-contract
// Description: Trait/DTO seams for external collaborators a governance host
//              depends on but this workspace does not implement: an OCI
//              registry, a secrets manager, a human review channel, and an
//              MCP tool catalog.
// ============================================================================

//! ## Overview
//! Everything here is a contract, not an implementation. A composition root
//! supplies one concrete type per trait; this crate's own impls (in each
//! module's test code) exist only to exercise those traits, never to be
//! deployed, the way the original source's "OPA guard mixin" collapsed into
//! a capability interface rather than an in-tree OPA client.

pub mod error;
pub mod registry;
pub mod review;
pub mod secrets;
pub mod tool_contract;

pub use error::ContractError;
pub use registry::OciArtifact;
pub use registry::OciRegistryClient;
pub use review::ReviewChannel;
pub use review::ReviewDecision;
pub use review::ReviewRequest;
pub use secrets::EnvSecretsStore;
pub use secrets::SecretsStore;
pub use tool_contract::McpToolContract;
pub use tool_contract::ToolContractRegistry;
