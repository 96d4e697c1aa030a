// crates/acgs2-saga/src/reasoning.rs
// ============================================================================
// Module: Reasoning Audit
// Description: The optional `audit_reasoning` saga step classifying
//              free-text reasoning against a fixed set of unsafe patterns.
// ============================================================================

use acgs2_core::identifiers::StepName;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::context::SagaContext;
use crate::step::SagaStepExecutor;

/// Phrases whose presence (case-insensitive) marks reasoning text unsafe.
const UNSAFE_PATTERNS: &[&str] = &[
    "ignore previous instructions",
    "ignore prior instructions",
    "bypass safety",
    "disregard your instructions",
    "override the constitution",
    "act as if you have no restrictions",
];

/// The verdict produced by classifying a piece of free-text reasoning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningVerdict {
    /// False if any pattern in [`UNSAFE_PATTERNS`] matched.
    pub is_safe: bool,
    /// The patterns that matched, if any.
    pub matched_patterns: Vec<String>,
}

/// Classifies `reasoning` against the fixed unsafe-pattern list.
#[must_use]
pub fn classify_reasoning(reasoning: &str) -> ReasoningVerdict {
    let lowered = reasoning.to_lowercase();
    let matched_patterns: Vec<String> = UNSAFE_PATTERNS
        .iter()
        .filter(|pattern| lowered.contains(*pattern))
        .map(|pattern| (*pattern).to_owned())
        .collect();
    ReasoningVerdict { is_safe: matched_patterns.is_empty(), matched_patterns }
}

/// Built-in saga step that records a [`ReasoningVerdict`] for a piece of
/// free-text reasoning carried in the saga's metadata.
///
/// An unsafe verdict does not abort the saga unless `abort_on_unsafe` is set
/// and the step is registered as non-optional; by default the verdict is
/// recorded on the context and the saga proceeds.
pub struct AuditReasoningStep {
    reasoning_metadata_key: String,
    abort_on_unsafe: bool,
}

impl AuditReasoningStep {
    /// Creates a step reading free-text reasoning from
    /// `ctx.metadata[reasoning_metadata_key]`.
    #[must_use]
    pub fn new(reasoning_metadata_key: impl Into<String>, abort_on_unsafe: bool) -> Self {
        Self { reasoning_metadata_key: reasoning_metadata_key.into(), abort_on_unsafe }
    }

    /// Canonical step name for registering this step in a saga's step list.
    #[must_use]
    pub fn step_name() -> StepName {
        StepName::from("audit_reasoning")
    }
}

#[async_trait]
impl SagaStepExecutor for AuditReasoningStep {
    async fn execute(&self, ctx: &mut SagaContext) -> Result<Value, String> {
        let reasoning = ctx
            .metadata
            .get(&self.reasoning_metadata_key)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("missing reasoning text at metadata key {}", self.reasoning_metadata_key))?
            .to_owned();

        let verdict = classify_reasoning(&reasoning);
        let result = serde_json::to_value(&verdict).map_err(|err| err.to_string())?;

        if !verdict.is_safe && self.abort_on_unsafe {
            return Err(format!("unsafe reasoning detected: {}", verdict.matched_patterns.join(", ")));
        }
        Ok(result)
    }
}
