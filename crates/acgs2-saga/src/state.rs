// crates/acgs2-saga/src/state.rs
// ============================================================================
// Module: Saga State
// Description: The durable record of a saga's progress; the only state that
//              is authoritative on resume.
// ============================================================================

use acgs2_core::identifiers::SagaId;
use acgs2_core::identifiers::StepName;
use serde::Deserialize;
use serde::Serialize;

use crate::context::SagaContext;

/// Schema version stamped on every persisted [`SagaState`].
pub const SAGA_STATE_VERSION: &str = "1.0.0";

/// A saga's position in its state machine.
///
/// ```text
/// pending ──execute_next──▶ executing
/// executing ──step_ok──▶ executing
/// executing ──all_done──▶ completed
/// executing ──step_fail──▶ compensating
/// compensating ──comp_ok_all──▶ compensated
/// compensating ──some_comp_fail──▶ partially_compensated
/// any ──fatal──▶ failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaStatus {
    /// Created but forward execution has not yet started.
    Pending,
    /// Forward steps are running.
    Executing,
    /// Every step completed successfully.
    Completed,
    /// A non-optional step failed; the compensation sweep is running.
    Compensating,
    /// The compensation sweep finished with no failures.
    Compensated,
    /// The compensation sweep finished but at least one compensation failed.
    PartiallyCompensated,
    /// A fatal condition (a `requires_previous` step blocked by a prior
    /// failure, or a missing compensation reference) ended the saga outside
    /// the normal forward/compensate flow.
    Failed,
}

impl SagaStatus {
    /// Returns whether this status ends the saga's lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Compensated | Self::PartiallyCompensated | Self::Failed
        )
    }

    /// Returns the snake_case wire label for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Compensating => "compensating",
            Self::Compensated => "compensated",
            Self::PartiallyCompensated => "partially_compensated",
            Self::Failed => "failed",
        }
    }
}

/// The durable record of a saga, persisted on every status change.
///
/// Only this document is authoritative across a process restart; step and
/// compensation definitions are supplied again by the caller on resume, the
/// way a workflow replay re-registers its activities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaState {
    /// Identifies this saga instance.
    pub saga_id: SagaId,
    /// Current position in the state machine.
    pub status: SagaStatus,
    /// Names of steps that completed successfully, in execution order.
    pub completed_steps: Vec<StepName>,
    /// The step whose exhausted retries triggered compensation, if any.
    pub failed_step: Option<StepName>,
    /// Names of steps whose compensation has run successfully, in sweep
    /// order (reverse of `completed_steps`).
    pub compensated_steps: Vec<StepName>,
    /// Names of steps whose compensation failed, in sweep order.
    pub failed_compensations: Vec<StepName>,
    /// Mutable scratch space read and written by steps and compensations.
    pub context: SagaContext,
    /// Schema version of this document.
    pub version: String,
}

impl SagaState {
    /// Creates a fresh, `pending` state for a new saga.
    #[must_use]
    pub fn new(saga_id: SagaId, context: SagaContext) -> Self {
        Self {
            saga_id,
            status: SagaStatus::Pending,
            completed_steps: Vec::new(),
            failed_step: None,
            compensated_steps: Vec::new(),
            failed_compensations: Vec::new(),
            context,
            version: SAGA_STATE_VERSION.to_owned(),
        }
    }
}
