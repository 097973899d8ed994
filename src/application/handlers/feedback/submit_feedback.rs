//! SubmitFeedbackHandler - Command handler for saving a contribution.
//!
//! The answer set must match the template exactly. An existing draft is
//! updated in place and every stored answer id must be sent back.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::handlers::cycle::PhaseService;
use crate::application::handlers::lookup::{require_profile, require_template};
use crate::domain::cycle::Phase;
use crate::domain::errors::FeedbackError;
use crate::domain::feedback::{prepare_submission, AnswerInput, Form, FormAddress, PreparedForm};
use crate::domain::foundation::{ErrorCode, Timestamp, Username};
use crate::ports::{Directory, EnrollmentRepository, FormRepository, TemplateRepository};

use super::access::check_contribution_access;

/// Command to submit a contribution.
#[derive(Debug, Clone)]
pub struct SubmitFeedbackCommand {
    pub from: Username,
    pub to: Username,
    pub answers: Vec<AnswerInput>,
    pub now: Timestamp,
}

/// Result of a saved contribution.
#[derive(Debug, Clone)]
pub struct SubmitFeedbackResult {
    pub form: Form,
    /// False when an existing draft was updated.
    pub created: bool,
}

/// Handler for submitting contributions.
pub struct SubmitFeedbackHandler {
    phases: Arc<PhaseService>,
    directory: Arc<dyn Directory>,
    enrollment_repository: Arc<dyn EnrollmentRepository>,
    template_repository: Arc<dyn TemplateRepository>,
    form_repository: Arc<dyn FormRepository>,
    business_unit: Option<String>,
}

impl SubmitFeedbackHandler {
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

    pub async fn handle(&self, cmd: SubmitFeedbackCommand) -> Result<SubmitFeedbackResult, FeedbackError> {
        // 1. Contributor, phase and access
        let contributor = require_profile(self.directory.as_ref(), &cmd.from).await?;
        let location = contributor.location();
        let current = self.phases.current(location, cmd.now).await?;
        self.phases
            .require("give feedback", &current, location, Phase::Entry, Phase::Entry)?;
        check_contribution_access(
            self.directory.as_ref(),
            self.enrollment_repository.as_ref(),
            self.business_unit.as_deref(),
            &current.cycle,
            &contributor,
            &cmd.to,
        )
        .await?;

        // 2. Validate answers against the template and any stored draft
        let template = require_template(self.template_repository.as_ref(), &current.cycle).await?;
        let existing = self
            .form_repository
            .find_contribution(&current.cycle.id(), &cmd.from, &cmd.to)
            .await?;
        let address = FormAddress {
            cycle_id: current.cycle.id(),
            from: cmd.from,
            to: cmd.to,
            is_summary: false,
        };
        let prepared = prepare_submission(&template, address, existing, &cmd.answers)?;

        // 3. Persist; the repository re-checks the summary rule in the write
        let created = prepared.is_new();
        let written = match &prepared {
            PreparedForm::Create(form) => self.form_repository.create(form).await,
            PreparedForm::Update(form) => self.form_repository.update_answers(form).await,
        };
        let form = prepared.into_form();
        if let Err(e) = written {
            if e.code == ErrorCode::SummaryExists {
                warn!(
                    cycle = %current.cycle.name(),
                    to = %form.to_username(),
                    "Contribution rejected, summary already written"
                );
            }
            return Err(e.into());
        }

        info!(
            cycle = %current.cycle.name(),
            from = %form.from_username(),
            to = %form.to_username(),
            created,
            "Feedback saved"
        );

        Ok(SubmitFeedbackResult { form, created })
    }
}
