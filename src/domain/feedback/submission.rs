//! Validation and planning of form submissions.
//!
//! A submission must answer exactly the template's questions. When a form
//! already exists, the submission must also name every stored answer so that
//! no answer is silently dropped; content is then updated in place.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::domain::cycle::QuestionTemplate;
use crate::domain::errors::FeedbackError;
use crate::domain::foundation::{AnswerId, CycleId, QuestionId, Username};

use super::{Answer, Form};

/// Upper bound on the characters in one answer.
pub const ANSWER_CHAR_LIMIT: usize = 60_000;

/// One submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: QuestionId,
    /// Required when updating an existing form.
    #[serde(default)]
    pub answer_id: Option<AnswerId>,
    #[serde(default)]
    pub answer: String,
}

impl AnswerInput {
    pub fn new(question_id: QuestionId, answer: impl Into<String>) -> Self {
        Self {
            question_id,
            answer_id: None,
            answer: answer.into(),
        }
    }

    pub fn for_answer(answer: &Answer, content: impl Into<String>) -> Self {
        Self {
            question_id: answer.question_id,
            answer_id: Some(answer.id),
            answer: content.into(),
        }
    }
}

/// Rejects content over [`ANSWER_CHAR_LIMIT`], reporting the excess.
pub fn check_answer_length(content: &str) -> Result<(), FeedbackError> {
    let length = content.chars().count();
    if length > ANSWER_CHAR_LIMIT {
        return Err(FeedbackError::validation(
            "answer",
            format!(
                "Character limit of {} has been exceeded by {}. Please reduce your answer size.",
                ANSWER_CHAR_LIMIT,
                length - ANSWER_CHAR_LIMIT
            ),
        ));
    }
    Ok(())
}

fn describe(ids: &BTreeSet<QuestionId>) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks that `inputs` answer each template question exactly once and that
/// no answer is too long.
pub fn validate_answer_set(
    template: &QuestionTemplate,
    inputs: &[AnswerInput],
) -> Result<(), FeedbackError> {
    let sent: BTreeSet<QuestionId> = inputs.iter().map(|i| i.question_id).collect();
    if sent.len() != inputs.len() {
        return Err(FeedbackError::validation(
            "answers",
            "A question was answered more than once",
        ));
    }

    let expected = template.question_ids();
    let missing: BTreeSet<QuestionId> = expected.difference(&sent).copied().collect();
    let unknown: BTreeSet<QuestionId> = sent.difference(&expected).copied().collect();
    if !missing.is_empty() || !unknown.is_empty() {
        let mut problems = Vec::new();
        if !missing.is_empty() {
            problems.push(format!("missing answers for questions {}", describe(&missing)));
        }
        if !unknown.is_empty() {
            problems.push(format!("questions {} are not in the template", describe(&unknown)));
        }
        return Err(FeedbackError::validation("answers", problems.join("; ")));
    }

    for input in inputs {
        check_answer_length(&input.answer)?;
    }
    Ok(())
}

/// A form ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedForm {
    Create(Form),
    Update(Form),
}

impl PreparedForm {
    pub fn form(&self) -> &Form {
        match self {
            PreparedForm::Create(form) | PreparedForm::Update(form) => form,
        }
    }

    pub fn into_form(self) -> Form {
        match self {
            PreparedForm::Create(form) | PreparedForm::Update(form) => form,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, PreparedForm::Create(_))
    }
}

/// Who a prepared form is from and to.
#[derive(Debug, Clone)]
pub struct FormAddress {
    pub cycle_id: CycleId,
    pub from: Username,
    pub to: Username,
    pub is_summary: bool,
}

/// Validates `inputs` and applies them to `existing`, or builds a new form.
pub fn prepare_submission(
    template: &QuestionTemplate,
    address: FormAddress,
    existing: Option<Form>,
    inputs: &[AnswerInput],
) -> Result<PreparedForm, FeedbackError> {
    validate_answer_set(template, inputs)?;

    match existing {
        Some(mut form) => {
            let stored: BTreeSet<AnswerId> = form.answers().iter().map(|a| a.id).collect();
            let sent: BTreeSet<AnswerId> = inputs.iter().filter_map(|i| i.answer_id).collect();
            if sent.len() != inputs.len() || stored != sent {
                return Err(FeedbackError::validation(
                    "answerId",
                    "Submitted answer ids do not match the answers already stored on this form",
                ));
            }
            for input in inputs {
                // answer_id is present for every input, checked above
                if let Some(answer_id) = input.answer_id {
                    let matches_question = form
                        .answer(answer_id)
                        .map_or(false, |a| a.question_id == input.question_id);
                    if !matches_question {
                        return Err(FeedbackError::validation(
                            "answerId",
                            format!("Answer {} does not belong to question {}", answer_id, input.question_id),
                        ));
                    }
                    form.set_content(answer_id, input.answer.clone());
                }
            }
            Ok(PreparedForm::Update(form))
        }
        None => {
            let answers = template
                .questions()
                .iter()
                .filter_map(|q| {
                    inputs
                        .iter()
                        .find(|i| i.question_id == q.id)
                        .map(|i| Answer::new(q.id, i.answer.clone()))
                })
                .collect();
            let form = Form::new(
                address.cycle_id,
                address.from,
                address.to,
                address.is_summary,
                answers,
            )?;
            Ok(PreparedForm::Create(form))
        }
    }
}
