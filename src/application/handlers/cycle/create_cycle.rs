//! CreateCycleHandler - Command handler for scheduling a new cycle.

use std::sync::Arc;

use tracing::info;

use crate::domain::cycle::{Cycle, CycleBoundaries};
use crate::domain::errors::FeedbackError;
use crate::domain::foundation::{ErrorCode, TemplateId, Timestamp};
use crate::ports::{CycleRepository, TemplateRepository};

/// Command to create a new cycle.
#[derive(Debug, Clone)]
pub struct CreateCycleCommand {
    /// Unique, human-facing name such as "2024 H1".
    pub name: String,
    /// Question template used by every form in the cycle.
    pub template_id: TemplateId,
    pub enroll_start: Timestamp,
    pub entry_start: Timestamp,
    pub approval_start: Timestamp,
    pub approval_end: Timestamp,
}

/// Result of successful cycle creation.
#[derive(Debug, Clone)]
pub struct CreateCycleResult {
    /// The created cycle.
    pub cycle: Cycle,
}

/// Handler for creating cycles.
pub struct CreateCycleHandler {
    cycle_repository: Arc<dyn CycleRepository>,
    template_repository: Arc<dyn TemplateRepository>,
}

impl CreateCycleHandler {
    pub fn new(
        cycle_repository: Arc<dyn CycleRepository>,
        template_repository: Arc<dyn TemplateRepository>,
    ) -> Self {
        Self {
            cycle_repository,
            template_repository,
        }
    }

    pub async fn handle(&self, cmd: CreateCycleCommand) -> Result<CreateCycleResult, FeedbackError> {
        // 1. Verify the template exists
        self.template_repository
            .find_by_id(&cmd.template_id)
            .await?
            .ok_or_else(|| {
                FeedbackError::not_found(
                    ErrorCode::TemplateNotFound,
                    format!("Template not found: {}", cmd.template_id),
                )
            })?;

        // 2. Build the aggregate (boundary order and name rules)
        let boundaries = CycleBoundaries::new(
            cmd.enroll_start,
            cmd.entry_start,
            cmd.approval_start,
            cmd.approval_end,
        )?;
        let cycle = Cycle::new(cmd.name, cmd.template_id, boundaries)?;

        // 3. Persist; the repository runs the overlap check in the same write
        self.cycle_repository.save(&cycle).await?;

        info!(cycle = %cycle.name(), cycle_id = %cycle.id(), "Cycle created");

        Ok(CreateCycleResult { cycle })
    }
}
