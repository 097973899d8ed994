//! GetSummaryHandler - Query handler for the summarizer's form.
//!
//! Until a summary exists, each question is seeded with the pooled
//! contributions for the recipient, shuffled afresh on every call. Once a
//! summary is stored its text is shown as written and pooling stops.

use std::sync::Arc;

use tracing::debug;

use crate::application::handlers::cycle::PhaseService;
use crate::application::handlers::lookup::{require_enrolled, require_profile, require_template};
use crate::domain::cycle::Phase;
use crate::domain::errors::FeedbackError;
use crate::domain::feedback::{Form, FormView, PooledAnswers};
use crate::domain::foundation::{Timestamp, Username};
use crate::ports::{Directory, EnrollmentRepository, FormRepository, TemplateRepository};

/// Query for the summary of one recipient.
#[derive(Debug, Clone)]
pub struct GetSummaryQuery {
    /// The manager writing the summary.
    pub from: Username,
    pub to: Username,
    pub now: Timestamp,
}

/// Summary form view and the stored summary, if any.
#[derive(Debug, Clone)]
pub struct GetSummaryResult {
    pub view: FormView,
    pub summary: Option<Form>,
    /// Contributions pooled into the view; zero once a summary exists.
    pub pooled_from: usize,
}

/// Handler building the summary payload.
pub struct GetSummaryHandler {
    phases: Arc<PhaseService>,
    directory: Arc<dyn Directory>,
    enrollment_repository: Arc<dyn EnrollmentRepository>,
    template_repository: Arc<dyn TemplateRepository>,
    form_repository: Arc<dyn FormRepository>,
}

impl GetSummaryHandler {
    pub fn new(
        phases: Arc<PhaseService>,
        directory: Arc<dyn Directory>,
        enrollment_repository: Arc<dyn EnrollmentRepository>,
        template_repository: Arc<dyn TemplateRepository>,
        form_repository: Arc<dyn FormRepository>,
    ) -> Self {
        Self {
            phases,
            directory,
            enrollment_repository,
            template_repository,
            form_repository,
        }
    }

    pub async fn handle(&self, query: GetSummaryQuery) -> Result<GetSummaryResult, FeedbackError> {
        let summarizer = require_profile(self.directory.as_ref(), &query.from).await?;
        let location = summarizer.location();
        let current = self.phases.current(location, query.now).await?;
        self.phases
            .require("view the summary", &current, location, Phase::Approval, Phase::Review)?;

        let recipient = require_profile(self.directory.as_ref(), &query.to).await?;
        require_enrolled(self.enrollment_repository.as_ref(), &current.cycle, &query.to).await?;
        let template = require_template(self.template_repository.as_ref(), &current.cycle).await?;

        let cycle_id = current.cycle.id();
        let summary = self.form_repository.find_summary(&cycle_id, &query.to).await?;

        let (pooled, pooled_from) = match summary {
            Some(_) => (None, 0),
            None => {
                let contributions = self
                    .form_repository
                    .list_contributions_to(&cycle_id, &query.to)
                    .await?;
                let pooled = {
                    let mut rng = rand::thread_rng();
                    PooledAnswers::collect(&contributions).shuffled(&mut rng)
                };
                debug!(
                    cycle = %current.cycle.name(),
                    to = %query.to,
                    contributions = contributions.len(),
                    "Pooled contributions for summary"
                );
                (Some(pooled), contributions.len())
            }
        };

        let view = FormView::build(
            &template,
            current.cycle.name(),
            &recipient.display_name,
            summary.as_ref(),
            pooled.as_ref(),
            self.phases
                .render(current.cycle.boundaries().approval_end(), location),
            current.phase == Phase::Review,
        );

        Ok(GetSummaryResult {
            view,
            summary,
            pooled_from,
        })
    }
}
