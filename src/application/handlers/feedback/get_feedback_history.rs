//! GetFeedbackHistoryHandler - Query handler for a user's past feedback.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::handlers::cycle::PhaseService;
use crate::application::handlers::lookup::{require_profile, require_template};
use crate::domain::cycle::QuestionTemplate;
use crate::domain::errors::FeedbackError;
use crate::domain::feedback::HistoryEntry;
use crate::domain::foundation::{TemplateId, Timestamp, Username};
use crate::ports::{CycleRepository, Directory, EnrollmentRepository, FormRepository, TemplateRepository};

/// Query for a user's feedback history.
#[derive(Debug, Clone)]
pub struct GetFeedbackHistoryQuery {
    pub username: Username,
    pub now: Timestamp,
}

/// History entries, newest cycle first.
#[derive(Debug, Clone)]
pub struct GetFeedbackHistoryResult {
    pub entries: Vec<HistoryEntry>,
}

/// Handler for feedback history.
pub struct GetFeedbackHistoryHandler {
    phases: Arc<PhaseService>,
    directory: Arc<dyn Directory>,
    cycle_repository: Arc<dyn CycleRepository>,
    enrollment_repository: Arc<dyn EnrollmentRepository>,
    template_repository: Arc<dyn TemplateRepository>,
    form_repository: Arc<dyn FormRepository>,
    history_limit: usize,
}

impl GetFeedbackHistoryHandler {
    pub fn new(
        phases: Arc<PhaseService>,
        directory: Arc<dyn Directory>,
        cycle_repository: Arc<dyn CycleRepository>,
        enrollment_repository: Arc<dyn EnrollmentRepository>,
        template_repository: Arc<dyn TemplateRepository>,
        form_repository: Arc<dyn FormRepository>,
        history_limit: usize,
    ) -> Self {
        Self {
            phases,
            directory,
            cycle_repository,
            enrollment_repository,
            template_repository,
            form_repository,
            history_limit,
        }
    }

    pub async fn handle(&self, query: GetFeedbackHistoryQuery) -> Result<GetFeedbackHistoryResult, FeedbackError> {
        let profile = require_profile(self.directory.as_ref(), &query.username).await?;

        let mut cycles = self.cycle_repository.list_all().await?;
        cycles.retain(|c| c.boundaries().enroll_start() <= query.now);
        cycles.sort_by_key(|c| std::cmp::Reverse(c.boundaries().enroll_start()));
        cycles.truncate(self.history_limit);

        let mut templates: HashMap<TemplateId, QuestionTemplate> = HashMap::new();
        let mut entries = Vec::with_capacity(cycles.len());
        for cycle in &cycles {
            if !templates.contains_key(&cycle.template_id()) {
                let template = require_template(self.template_repository.as_ref(), cycle).await?;
                templates.insert(cycle.template_id(), template);
            }
            let Some(template) = templates.get(&cycle.template_id()) else {
                continue;
            };

            let phase = self.phases.phase(cycle, profile.location(), query.now);
            let enrolled = self
                .enrollment_repository
                .is_enrolled(&cycle.id(), &query.username)
                .await?;
            let summary = self
                .form_repository
                .find_summary(&cycle.id(), &query.username)
                .await?;

            entries.push(HistoryEntry::classify(
                cycle,
                phase,
                template,
                &profile.display_name,
                enrolled,
                summary.as_ref(),
            ));
        }

        Ok(GetFeedbackHistoryResult { entries })
    }
}
