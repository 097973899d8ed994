//! SubmitSummaryHandler - Command handler for saving a recipient's summary.
//!
//! Answers carrying ids update the stored summary in place. Answers without
//! ids create the summary; if another manager got there first the write is
//! rejected naming their summary.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::handlers::cycle::PhaseService;
use crate::application::handlers::lookup::{require_enrolled, require_profile, require_template};
use crate::domain::cycle::Phase;
use crate::domain::errors::FeedbackError;
use crate::domain::feedback::{prepare_submission, AnswerInput, Form, FormAddress, PreparedForm};
use crate::domain::foundation::{ErrorCode, Timestamp, Username};
use crate::ports::{Directory, EnrollmentRepository, FormRepository, TemplateRepository};

/// Command to save a summary.
#[derive(Debug, Clone)]
pub struct SubmitSummaryCommand {
    /// The manager writing the summary.
    pub from: Username,
    pub to: Username,
    pub answers: Vec<AnswerInput>,
    pub now: Timestamp,
}

/// Result of a saved summary.
#[derive(Debug, Clone)]
pub struct SubmitSummaryResult {
    pub form: Form,
    pub created: bool,
}

/// Handler for submitting summaries.
pub struct SubmitSummaryHandler {
    phases: Arc<PhaseService>,
    directory: Arc<dyn Directory>,
    enrollment_repository: Arc<dyn EnrollmentRepository>,
    template_repository: Arc<dyn TemplateRepository>,
    form_repository: Arc<dyn FormRepository>,
}

impl SubmitSummaryHandler {
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

    pub async fn handle(&self, cmd: SubmitSummaryCommand) -> Result<SubmitSummaryResult, FeedbackError> {
        // 1. Summaries are editable during approval only
        let summarizer = require_profile(self.directory.as_ref(), &cmd.from).await?;
        let location = summarizer.location();
        let current = self.phases.current(location, cmd.now).await?;
        self.phases
            .require("edit the summary", &current, location, Phase::Approval, Phase::Approval)?;

        if cmd.from == cmd.to {
            return Err(FeedbackError::validation("to", "You cannot summarise your own feedback"));
        }
        require_profile(self.directory.as_ref(), &cmd.to).await?;
        require_enrolled(self.enrollment_repository.as_ref(), &current.cycle, &cmd.to).await?;

        // 2. Updating needs the stored summary; creating starts fresh
        let cycle_id = current.cycle.id();
        let existing = if cmd.answers.iter().any(|a| a.answer_id.is_some()) {
            let stored = self
                .form_repository
                .find_summary(&cycle_id, &cmd.to)
                .await?
                .ok_or_else(|| {
                    FeedbackError::not_found(
                        ErrorCode::FormNotFound,
                        format!("No summary for {} in cycle {} to update", cmd.to, current.cycle.name()),
                    )
                })?;
            Some(stored)
        } else {
            None
        };

        let template = require_template(self.template_repository.as_ref(), &current.cycle).await?;
        let address = FormAddress {
            cycle_id,
            from: cmd.from,
            to: cmd.to,
            is_summary: true,
        };
        let prepared = prepare_submission(&template, address, existing, &cmd.answers)?;

        // 3. Persist; one summary per recipient is enforced inside the write
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
                    author = e.detail("author").unwrap_or_default(),
                    "Summary already written by another manager"
                );
            }
            return Err(e.into());
        }

        info!(
            cycle = %current.cycle.name(),
            from = %form.from_username(),
            to = %form.to_username(),
            created,
            "Summary saved"
        );

        Ok(SubmitSummaryResult { form, created })
    }
}
