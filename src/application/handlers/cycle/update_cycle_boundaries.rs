//! UpdateCycleBoundariesHandler - Command handler for rescheduling a cycle.
//!
//! Moving a boundary can collide with either neighbour, so the overlap rule
//! is re-run against both on every update.

use std::sync::Arc;

use tracing::info;

use crate::domain::cycle::{Cycle, CycleBoundaries};
use crate::domain::errors::FeedbackError;
use crate::domain::foundation::{CycleId, ErrorCode, Timestamp};
use crate::ports::CycleRepository;

/// Command to move the boundaries of an existing cycle.
#[derive(Debug, Clone)]
pub struct UpdateCycleBoundariesCommand {
    pub cycle_id: CycleId,
    pub enroll_start: Timestamp,
    pub entry_start: Timestamp,
    pub approval_start: Timestamp,
    pub approval_end: Timestamp,
}

/// Result of a successful reschedule.
#[derive(Debug, Clone)]
pub struct UpdateCycleBoundariesResult {
    pub cycle: Cycle,
}

/// Handler for rescheduling cycles.
pub struct UpdateCycleBoundariesHandler {
    cycle_repository: Arc<dyn CycleRepository>,
}

impl UpdateCycleBoundariesHandler {
    pub fn new(cycle_repository: Arc<dyn CycleRepository>) -> Self {
        Self { cycle_repository }
    }

    pub async fn handle(
        &self,
        cmd: UpdateCycleBoundariesCommand,
    ) -> Result<UpdateCycleBoundariesResult, FeedbackError> {
        let mut cycle = self
            .cycle_repository
            .find_by_id(&cmd.cycle_id)
            .await?
            .ok_or_else(|| {
                FeedbackError::not_found(
                    ErrorCode::CycleNotFound,
                    format!("Cycle not found: {}", cmd.cycle_id),
                )
            })?;

        let boundaries = CycleBoundaries::new(
            cmd.enroll_start,
            cmd.entry_start,
            cmd.approval_start,
            cmd.approval_end,
        )?;
        cycle.reschedule(boundaries);

        self.cycle_repository.update(&cycle).await?;

        info!(cycle = %cycle.name(), "Cycle boundaries updated");

        Ok(UpdateCycleBoundariesResult { cycle })
    }
}
