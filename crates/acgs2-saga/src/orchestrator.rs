// crates/acgs2-saga/src/orchestrator.rs
// ============================================================================
// Module: Saga Orchestrator
// Description: C4 — ordered forward execution with retries, reverse
//              compensation on failure, and crash-safe resume.
// ============================================================================

use std::collections::HashMap;

use acgs2_core::identifiers::SagaId;
use serde_json::Value;
use tracing::info;
use tracing::warn;

use crate::context::SagaContext;
use crate::error::SagaError;
use crate::state::SagaState;
use crate::state::SagaStatus;
use crate::step::SagaCompensation;
use crate::step::SagaStep;
use crate::store::SagaStore;

/// Runs sagas against a declared step/compensation table, persisting state
/// through an injected [`SagaStore`].
///
/// Steps and compensations are supplied per call rather than held by the
/// orchestrator: they carry trait objects that are not themselves
/// serializable, so a resumed saga's definitions come from whatever the
/// caller registers again, analogous to a workflow engine's replay model.
pub struct SagaOrchestrator<S> {
    store: S,
}

impl<S: SagaStore> SagaOrchestrator<S> {
    /// Builds an orchestrator persisting through `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Starts a new saga and runs it to a terminal state: `completed`,
    /// `compensated`, `partially_compensated`, or `failed`.
    ///
    /// # Errors
    /// Returns [`SagaError::Store`] if persistence fails at any point.
    pub async fn run(
        &self,
        saga_id: SagaId,
        steps: &[SagaStep],
        compensations: &[SagaCompensation],
        metadata: HashMap<String, Value>,
    ) -> Result<SagaState, SagaError> {
        let context = SagaContext::new(saga_id.clone(), metadata);
        let mut state = SagaState::new(saga_id, context);
        state.status = SagaStatus::Executing;
        self.persist(&state).await?;

        self.execute_forward(&mut state, steps, 0).await?;
        if state.status == SagaStatus::Compensating {
            self.execute_compensation(&mut state, steps, compensations).await?;
        }
        Ok(state)
    }

    /// Reads persisted state for `saga_id` and continues it from the first
    /// step beyond `completed_steps`, or from the next un-compensated index
    /// if compensation was already in progress. Returns `None` if no state
    /// was ever persisted for this saga.
    ///
    /// # Errors
    /// Returns [`SagaError::Store`] if persistence fails.
    pub async fn resume(
        &self,
        saga_id: &SagaId,
        steps: &[SagaStep],
        compensations: &[SagaCompensation],
    ) -> Result<Option<SagaState>, SagaError> {
        let Some(mut state) = self.store.load(saga_id).await? else {
            return Ok(None);
        };

        match state.status {
            SagaStatus::Compensating => {
                self.execute_compensation(&mut state, steps, compensations).await?;
            }
            SagaStatus::Pending | SagaStatus::Executing => {
                let start_index = state.completed_steps.len();
                self.execute_forward(&mut state, steps, start_index).await?;
                if state.status == SagaStatus::Compensating {
                    self.execute_compensation(&mut state, steps, compensations).await?;
                }
            }
            SagaStatus::Completed
            | SagaStatus::Compensated
            | SagaStatus::PartiallyCompensated
            | SagaStatus::Failed => {}
        }

        Ok(Some(state))
    }

    /// Runs forward steps starting at `start_index`, persisting after every
    /// step completion or status change.
    async fn execute_forward(
        &self,
        state: &mut SagaState,
        steps: &[SagaStep],
        start_index: usize,
    ) -> Result<(), SagaError> {
        for step in steps.iter().skip(start_index) {
            if step.requires_previous && state.failed_step.is_some() {
                state.status = SagaStatus::Failed;
                self.persist(state).await?;
                return Ok(());
            }

            match execute_step_with_retries(step, &mut state.context).await {
                Ok(result) => {
                    state.context.set_step_result(&step.name, result);
                    state.completed_steps.push(step.name.clone());
                    info!(step = %step.name, saga_id = %state.saga_id, "saga step completed");
                    self.persist(state).await?;
                }
                Err(reason) => {
                    state.context.errors.push(reason.clone());
                    if step.is_optional {
                        warn!(step = %step.name, saga_id = %state.saga_id, reason, "optional saga step failed, skipping");
                        continue;
                    }
                    warn!(step = %step.name, saga_id = %state.saga_id, reason, "saga step failed, entering compensation");
                    state.failed_step = Some(step.name.clone());
                    state.status = SagaStatus::Compensating;
                    self.persist(state).await?;
                    return Ok(());
                }
            }
        }

        state.status = SagaStatus::Completed;
        self.persist(state).await?;
        Ok(())
    }

    /// Walks `completed_steps` in reverse, running the compensation for each
    /// step that has not already been compensated. Failures are recorded in
    /// `failed_compensations` and never abort the sweep.
    async fn execute_compensation(
        &self,
        state: &mut SagaState,
        steps: &[SagaStep],
        compensations: &[SagaCompensation],
    ) -> Result<(), SagaError> {
        let completed_in_order = state.completed_steps.clone();
        for step_name in completed_in_order.iter().rev() {
            if state.compensated_steps.contains(step_name) {
                continue;
            }

            let Some(step) = steps.iter().find(|candidate| &candidate.name == step_name) else {
                continue;
            };
            let Some(comp_index) = step.compensation else {
                continue;
            };
            let compensation = compensations.get(comp_index).ok_or_else(|| {
                SagaError::UnknownCompensation { step: step_name.to_string(), index: comp_index }
            })?;

            match execute_compensation_with_retries(compensation, &mut state.context).await {
                Ok(()) => {
                    state.compensated_steps.push(step_name.clone());
                    info!(step = %step_name, saga_id = %state.saga_id, "compensation completed");
                }
                Err(reason) => {
                    state.context.errors.push(reason.clone());
                    state.failed_compensations.push(step_name.clone());
                    warn!(step = %step_name, saga_id = %state.saga_id, reason, "compensation failed");
                }
            }
            self.persist(state).await?;
        }

        state.status = if state.failed_compensations.is_empty() {
            SagaStatus::Compensated
        } else {
            SagaStatus::PartiallyCompensated
        };
        self.persist(state).await
    }

    /// Persists `state` through the injected store.
    async fn persist(&self, state: &SagaState) -> Result<(), SagaError> {
        self.store.save(state).await.map_err(SagaError::from)
    }
}

/// Retries a step's action up to its configured retry budget, sleeping the
/// fixed `retry_delay` between attempts.
async fn execute_step_with_retries(step: &SagaStep, ctx: &mut SagaContext) -> Result<Value, String> {
    let mut last_err = String::new();
    for attempt_index in 0..=step.max_retries {
        let outcome = tokio::time::timeout(std_duration(step.timeout), step.executor.execute(ctx))
            .await
            .unwrap_or_else(|_| Err(format!("step timed out after {}s", step.timeout.whole_seconds())));
        match outcome {
            Ok(value) => return Ok(value),
            Err(err) => {
                last_err = err;
                if attempt_index < step.max_retries {
                    tokio::time::sleep(std_duration(step.retry_delay)).await;
                }
            }
        }
    }
    Err(last_err)
}

/// Retries a compensation's action up to its configured retry budget.
async fn execute_compensation_with_retries(
    compensation: &SagaCompensation,
    ctx: &mut SagaContext,
) -> Result<(), String> {
    let mut last_err = String::new();
    for attempt_index in 0..=compensation.max_retries {
        match compensation.executor.execute(ctx).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                last_err = err;
                if attempt_index < compensation.max_retries {
                    tokio::time::sleep(std_duration(compensation.retry_delay)).await;
                }
            }
        }
    }
    Err(last_err)
}

/// Converts a `time::Duration` into a non-negative `std::time::Duration`.
fn std_duration(duration: time::Duration) -> std::time::Duration {
    std::time::Duration::new(u64::try_from(duration.whole_seconds().max(0)).unwrap_or(u64::MAX), 0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use std::sync::atomic::AtomicU32;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use async_trait::async_trait;
    use time::Duration;

    use super::*;
    use crate::step::SagaCompensationExecutor;
    use crate::step::SagaStepExecutor;
    use crate::store::InMemorySagaStore;

    struct AlwaysOk;

    #[async_trait]
    impl SagaStepExecutor for AlwaysOk {
        async fn execute(&self, _ctx: &mut SagaContext) -> Result<Value, String> {
            Ok(Value::Bool(true))
        }
    }

    struct AlwaysFail;

    #[async_trait]
    impl SagaStepExecutor for AlwaysFail {
        async fn execute(&self, _ctx: &mut SagaContext) -> Result<Value, String> {
            Err("boom".to_owned())
        }
    }

    struct NeverReturns;

    #[async_trait]
    impl SagaStepExecutor for NeverReturns {
        async fn execute(&self, _ctx: &mut SagaContext) -> Result<Value, String> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok(Value::Bool(true))
        }
    }

    struct CountingCompensation(Arc<AtomicU32>);

    #[async_trait]
    impl SagaCompensationExecutor for CountingCompensation {
        async fn execute(&self, _ctx: &mut SagaContext) -> Result<(), String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fast_step(name: &str, executor: Arc<dyn SagaStepExecutor>) -> SagaStep {
        let mut step = SagaStep::new(name, executor);
        step.max_retries = 0;
        step.retry_delay = Duration::ZERO;
        step
    }

    #[tokio::test]
    async fn every_step_succeeding_completes_the_saga() {
        let orchestrator = SagaOrchestrator::new(InMemorySagaStore::new());
        let steps = vec![fast_step("step1", Arc::new(AlwaysOk)), fast_step("step2", Arc::new(AlwaysOk))];

        let state = orchestrator
            .run(SagaId::from("ok-saga"), &steps, &[], HashMap::new())
            .await
            .expect("run succeeds");

        assert_eq!(state.status, SagaStatus::Completed);
        assert_eq!(state.completed_steps.len(), 2);
    }

    #[tokio::test]
    async fn a_failing_step_triggers_compensation_of_completed_steps() {
        let comp_calls = Arc::new(AtomicU32::new(0));
        let compensation = SagaCompensation::new("undo-step1", Arc::new(CountingCompensation(comp_calls.clone())));
        let step1 = fast_step("step1", Arc::new(AlwaysOk)).with_compensation(0);
        let step2 = fast_step("step2", Arc::new(AlwaysFail));

        let orchestrator = SagaOrchestrator::new(InMemorySagaStore::new());
        let state = orchestrator
            .run(SagaId::from("fail-saga"), &[step1, step2], &[compensation], HashMap::new())
            .await
            .expect("run completes with compensation");

        assert_eq!(state.status, SagaStatus::Compensated);
        assert_eq!(state.failed_step, Some(acgs2_core::identifiers::StepName::from("step2")));
        assert_eq!(comp_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn optional_step_failure_skips_without_compensating() {
        let step1 = fast_step("step1", Arc::new(AlwaysOk));
        let optional = fast_step("optional", Arc::new(AlwaysFail)).optional();
        let step3 = fast_step("step3", Arc::new(AlwaysOk));

        let orchestrator = SagaOrchestrator::new(InMemorySagaStore::new());
        let state = orchestrator
            .run(SagaId::from("optional-saga"), &[step1, optional, step3], &[], HashMap::new())
            .await
            .expect("run completes");

        assert_eq!(state.status, SagaStatus::Completed);
        assert_eq!(state.completed_steps.len(), 2);
    }

    #[tokio::test]
    async fn resume_continues_from_the_first_incomplete_step() {
        let store = InMemorySagaStore::new();
        let saga_id = SagaId::from("resume-saga");
        let mut context = SagaContext::new(saga_id.clone(), HashMap::new());
        context.set_step_result(&acgs2_core::identifiers::StepName::from("step1"), Value::Bool(true));
        let mut state = SagaState::new(saga_id.clone(), context);
        state.status = SagaStatus::Executing;
        state.completed_steps.push(acgs2_core::identifiers::StepName::from("step1"));
        store.save(&state).await.expect("seed state");

        let orchestrator = SagaOrchestrator::new(store);
        let steps = vec![fast_step("step1", Arc::new(AlwaysOk)), fast_step("step2", Arc::new(AlwaysOk))];
        let resumed = orchestrator
            .resume(&saga_id, &steps, &[])
            .await
            .expect("resume succeeds")
            .expect("saga was persisted");

        assert_eq!(resumed.status, SagaStatus::Completed);
        assert_eq!(resumed.completed_steps.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn a_step_that_hangs_past_its_timeout_is_treated_as_a_retryable_failure() {
        let mut step = fast_step("step1", Arc::new(NeverReturns));
        step.timeout = Duration::milliseconds(10);

        let orchestrator = SagaOrchestrator::new(InMemorySagaStore::new());
        let state = orchestrator
            .run(SagaId::from("hanging-saga"), &[step], &[], HashMap::new())
            .await
            .expect("run completes with a failure, not a hang");

        assert_eq!(state.status, SagaStatus::Compensated);
        assert_eq!(state.failed_step, Some(acgs2_core::identifiers::StepName::from("step1")));
    }

    #[tokio::test]
    async fn resume_of_an_unknown_saga_returns_none() {
        let orchestrator = SagaOrchestrator::new(InMemorySagaStore::new());
        let resumed = orchestrator.resume(&SagaId::from("never-existed"), &[], &[]).await.expect("resume succeeds");
        assert!(resumed.is_none());
    }

    #[tokio::test]
    async fn resume_of_a_compensating_saga_continues_the_sweep() {
        let store = InMemorySagaStore::new();
        let saga_id = SagaId::from("blocked-saga");
        let mut state = SagaState::new(saga_id.clone(), SagaContext::new(saga_id.clone(), HashMap::new()));
        state.status = SagaStatus::Compensating;
        state.failed_step = Some(acgs2_core::identifiers::StepName::from("step1"));
        store.save(&state).await.expect("seed state");

        let orchestrator = SagaOrchestrator::new(store);
        let resumed = orchestrator
            .resume(&saga_id, &[], &[])
            .await
            .expect("resume succeeds")
            .expect("saga was persisted");

        assert_eq!(resumed.status, SagaStatus::Compensated);
    }
}
