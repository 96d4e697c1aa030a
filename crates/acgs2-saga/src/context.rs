// crates/acgs2-saga/src/context.rs
// ============================================================================
// Module: Saga Context
// Description: The mutable scratch space step executors and compensations
//              read from and write to over a saga's lifetime.
// ============================================================================

use std::collections::HashMap;

use acgs2_core::identifiers::SagaId;
use acgs2_core::identifiers::StepName;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// State shared across a saga's forward steps and compensations.
///
/// Owned by the saga; step executors write results through
/// [`SagaContext::set_step_result`], compensations read them back through
/// [`SagaContext::get_step_result`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaContext {
    /// The saga this context belongs to.
    pub saga_id: SagaId,
    /// Results keyed by the step that produced them; a later call with the
    /// same key overwrites the earlier result.
    pub step_results: HashMap<String, Value>,
    /// Caller-supplied metadata, fixed for the lifetime of the saga.
    pub metadata: HashMap<String, Value>,
    /// Error messages accumulated across failed steps and compensations, in
    /// the order they occurred.
    pub errors: Vec<String>,
}

impl SagaContext {
    /// Creates a new, empty context for `saga_id`.
    #[must_use]
    pub fn new(saga_id: SagaId, metadata: HashMap<String, Value>) -> Self {
        Self { saga_id, step_results: HashMap::new(), metadata, errors: Vec::new() }
    }

    /// Records `result` under `step`, replacing any prior result for it.
    pub fn set_step_result(&mut self, step: &StepName, result: Value) {
        self.step_results.insert(step.as_str().to_owned(), result);
    }

    /// Returns the result previously recorded for `step`, if any.
    #[must_use]
    pub fn get_step_result(&self, step: &StepName) -> Option<&Value> {
        self.step_results.get(step.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;

    #[test]
    fn later_results_overwrite_earlier_ones_for_the_same_step() {
        let mut ctx = SagaContext::new(SagaId::from("saga-1"), HashMap::new());
        let step = StepName::from("reserve");
        ctx.set_step_result(&step, serde_json::json!({"original": true}));
        ctx.set_step_result(&step, serde_json::json!({"updated": true}));

        let result = ctx.get_step_result(&step).expect("result present");
        assert_eq!(result, &serde_json::json!({"updated": true}));
    }

    #[test]
    fn results_for_distinct_steps_do_not_collide() {
        let mut ctx = SagaContext::new(SagaId::from("saga-2"), HashMap::new());
        ctx.set_step_result(&StepName::from("step1"), serde_json::json!(1));
        ctx.set_step_result(&StepName::from("step2"), serde_json::json!(2));

        assert_eq!(ctx.get_step_result(&StepName::from("step1")), Some(&serde_json::json!(1)));
        assert_eq!(ctx.get_step_result(&StepName::from("step2")), Some(&serde_json::json!(2)));
    }

    #[test]
    fn errors_accumulate_in_order() {
        let mut ctx = SagaContext::new(SagaId::from("saga-3"), HashMap::new());
        ctx.errors.push("first".to_owned());
        ctx.errors.push("second".to_owned());
        assert_eq!(ctx.errors, vec!["first".to_owned(), "second".to_owned()]);
    }
}
