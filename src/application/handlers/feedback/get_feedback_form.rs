//! GetFeedbackFormHandler - Query handler for a contributor's draft.
//!
//! Returns the stored contribution for (contributor, recipient) in the
//! current cycle, or no draft when none was saved yet, together with the
//! ordered form view.

use std::sync::Arc;

use crate::application::handlers::cycle::PhaseService;
use crate::application::handlers::lookup::{require_profile, require_template};
use crate::domain::cycle::Phase;
use crate::domain::errors::FeedbackError;
use crate::domain::feedback::{Form, FormView};
use crate::domain::foundation::{Timestamp, Username};
use crate::ports::{Directory, EnrollmentRepository, FormRepository, TemplateRepository};

use super::access::check_contribution_access;

/// Query for a contribution form.
#[derive(Debug, Clone)]
pub struct GetFeedbackFormQuery {
    pub from: Username,
    pub to: Username,
    pub now: Timestamp,
}

/// Result containing the form view and the stored draft, if any.
#[derive(Debug, Clone)]
pub struct GetFeedbackFormResult {
    pub view: FormView,
    pub draft: Option<Form>,
}

/// Handler for loading contribution forms.
pub struct GetFeedbackFormHandler {
    phases: Arc<PhaseService>,
    directory: Arc<dyn Directory>,
    enrollment_repository: Arc<dyn EnrollmentRepository>,
    template_repository: Arc<dyn TemplateRepository>,
    form_repository: Arc<dyn FormRepository>,
    business_unit: Option<String>,
}

impl GetFeedbackFormHandler {
    pub fn new(
        phases: Arc<PhaseService>,
        directory: Arc<dyn Directory>,
        enrollment_repository: Arc<dyn EnrollmentRepository>,
        template_repository: Arc<dyn TemplateRepository>,
        form_repository: Arc<dyn FormRepository>,
        business_unit: Option<String>,
    ) -> Self {
        Self {
            phases,
            directory,
            enrollment_repository,
            template_repository,
            form_repository,
            business_unit,
        }
    }

    pub async fn handle(&self, query: GetFeedbackFormQuery) -> Result<GetFeedbackFormResult, FeedbackError> {
        let contributor = require_profile(self.directory.as_ref(), &query.from).await?;
        let location = contributor.location();

        let current = self.phases.current(location, query.now).await?;
        self.phases
            .require("give feedback", &current, location, Phase::Entry, Phase::Entry)?;

        let recipient = check_contribution_access(
            self.directory.as_ref(),
            self.enrollment_repository.as_ref(),
            self.business_unit.as_deref(),
            &current.cycle,
            &contributor,
            &query.to,
        )
        .await?;

        let template = require_template(self.template_repository.as_ref(), &current.cycle).await?;
        let draft = self
            .form_repository
            .find_contribution(&current.cycle.id(), &query.from, &query.to)
            .await?;

        // Entry closes when approval starts.
        let end_date = self
            .phases
            .render(current.cycle.boundaries().approval_start(), location);
        let view = FormView::build(
            &template,
            current.cycle.name(),
            &recipient.display_name,
            draft.as_ref(),
            None,
            end_date,
            false,
        );

        Ok(GetFeedbackFormResult { view, draft })
    }
}
