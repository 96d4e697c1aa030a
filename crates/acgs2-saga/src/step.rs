// crates/acgs2-saga/src/step.rs
// ============================================================================
// Module: Saga Steps and Compensations
// Description: Immutable step/compensation declarations plus the trait seams
//              their behavior is reached through.
// ============================================================================

use std::sync::Arc;

use acgs2_core::identifiers::StepName;
use async_trait::async_trait;
use serde_json::Value;
use time::Duration;

use crate::context::SagaContext;

/// A single forward action a saga executes.
///
/// Implementations should treat `ctx` as read/write scratch space only; the
/// orchestrator owns retries, timeouts, and persistence around the call.
#[async_trait]
pub trait SagaStepExecutor: Send + Sync {
    /// Performs the step's action, returning a JSON result recorded into the
    /// saga context on success.
    ///
    /// # Errors
    /// Returns a human-readable failure reason; the orchestrator decides
    /// whether this failure is retried, skipped, or triggers compensation.
    async fn execute(&self, ctx: &mut SagaContext) -> Result<Value, String>;
}

/// The reverse action undoing a previously completed [`SagaStep`].
///
/// Must be safe to retry: the compensation sweep does not deduplicate.
#[async_trait]
pub trait SagaCompensationExecutor: Send + Sync {
    /// Undoes the effect of the step this compensation is paired with.
    ///
    /// # Errors
    /// Returns a human-readable failure reason; compensation failures are
    /// recorded but never abort the sweep.
    async fn execute(&self, ctx: &mut SagaContext) -> Result<(), String>;
}

/// Default timeout for a step with no explicit override.
pub const DEFAULT_STEP_TIMEOUT_SECONDS: u64 = 30;
/// Default retry budget for a step with no explicit override.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default fixed delay between retries, in seconds.
pub const DEFAULT_RETRY_DELAY_SECONDS: f64 = 1.0;

/// A single forward step in a saga's declared order.
///
/// Immutable once the saga it belongs to has started. `compensation` is an
/// index into the saga's parallel `compensations` array rather than a direct
/// reference, so step declarations never form a reference cycle across the
/// serialization boundary.
#[derive(Clone)]
pub struct SagaStep {
    /// Name of the step; unique within its owning saga's step order.
    pub name: StepName,
    /// The action this step performs.
    pub executor: Arc<dyn SagaStepExecutor>,
    /// Index into the saga's compensation table, if this step is reversible.
    pub compensation: Option<usize>,
    /// Wall-clock budget for a single attempt.
    pub timeout: Duration,
    /// Maximum number of retries after the first attempt fails.
    pub max_retries: u32,
    /// Fixed delay between retries.
    pub retry_delay: Duration,
    /// If true, exhausting retries skips the step instead of compensating.
    pub is_optional: bool,
    /// If true, a prior step's failure marks this saga `failed` without
    /// attempting this step.
    pub requires_previous: bool,
    /// Optional idempotency key; the orchestrator does not deduplicate on
    /// it, but callers may use it inside their executor to detect retries.
    pub idempotency_key: Option<String>,
}

impl SagaStep {
    /// Builds a step with the standard defaults: 30s timeout, 3 retries, a
    /// 1s fixed retry delay, required (non-optional), and dependent on the
    /// previous step having succeeded.
    #[must_use]
    pub fn new(name: impl Into<StepName>, executor: Arc<dyn SagaStepExecutor>) -> Self {
        Self {
            name: name.into(),
            executor,
            compensation: None,
            timeout: Duration::seconds(i64::try_from(DEFAULT_STEP_TIMEOUT_SECONDS).unwrap_or(30)),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::seconds_f64(DEFAULT_RETRY_DELAY_SECONDS),
            is_optional: false,
            requires_previous: true,
            idempotency_key: None,
        }
    }

    /// Pairs this step with a compensation at `index` in the saga's
    /// compensation table.
    #[must_use]
    pub const fn with_compensation(mut self, index: usize) -> Self {
        self.compensation = Some(index);
        self
    }

    /// Marks this step optional: exhausted retries skip it rather than
    /// entering compensation.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }
}

/// The reverse action undoing a completed [`SagaStep`].
#[derive(Clone)]
pub struct SagaCompensation {
    /// Name of the compensation, used in logging and `failed_compensations`.
    pub name: StepName,
    /// The undo action this compensation performs.
    pub executor: Arc<dyn SagaCompensationExecutor>,
    /// Maximum number of retries after the first attempt fails.
    pub max_retries: u32,
    /// Fixed delay between retries.
    pub retry_delay: Duration,
}

impl SagaCompensation {
    /// Builds a compensation with the standard defaults: 3 retries, a 1s
    /// fixed retry delay.
    #[must_use]
    pub fn new(name: impl Into<StepName>, executor: Arc<dyn SagaCompensationExecutor>) -> Self {
        Self {
            name: name.into(),
            executor,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::seconds_f64(DEFAULT_RETRY_DELAY_SECONDS),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;

    struct NoopStep;

    #[async_trait]
    impl SagaStepExecutor for NoopStep {
        async fn execute(&self, _ctx: &mut SagaContext) -> Result<Value, String> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn default_step_matches_documented_defaults() {
        let step = SagaStep::new("minimal", Arc::new(NoopStep));
        assert_eq!(step.timeout, Duration::seconds(30));
        assert_eq!(step.max_retries, 3);
        assert_eq!(step.retry_delay, Duration::seconds_f64(1.0));
        assert!(!step.is_optional);
        assert!(step.requires_previous);
        assert!(step.compensation.is_none());
    }

    #[test]
    fn optional_and_with_compensation_builders_compose() {
        let step = SagaStep::new("reserve", Arc::new(NoopStep)).with_compensation(0).optional();
        assert_eq!(step.compensation, Some(0));
        assert!(step.is_optional);
    }
}
