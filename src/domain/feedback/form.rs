//! Form aggregate - answers written by one author about one recipient.

use crate::domain::foundation::{
    AnswerId, CycleId, DomainError, ErrorCode, FormId, QuestionId, Username, Validatable,
    ValidationError,
};

/// One stored answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub content: String,
}

impl Answer {
    pub fn new(question_id: QuestionId, content: impl Into<String>) -> Self {
        Self {
            id: AnswerId::new(),
            question_id,
            content: content.into(),
        }
    }
}

/// A contribution, or the single per-recipient summary, for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    id: FormId,
    cycle_id: CycleId,
    from_username: Username,
    to_username: Username,
    is_summary: bool,
    answers: Vec<Answer>,
}

impl Form {
    /// Creates a new form. Author and recipient must differ.
    pub fn new(
        cycle_id: CycleId,
        from_username: Username,
        to_username: Username,
        is_summary: bool,
        answers: Vec<Answer>,
    ) -> Result<Self, ValidationError> {
        if from_username == to_username {
            return Err(ValidationError::invalid_format(
                "to_username",
                "feedback cannot be addressed to its author",
            ));
        }
        Ok(Self {
            id: FormId::new(),
            cycle_id,
            from_username,
            to_username,
            is_summary,
            answers,
        })
    }

    /// Reconstitutes a form from persisted data.
    pub fn reconstitute(
        id: FormId,
        cycle_id: CycleId,
        from_username: Username,
        to_username: Username,
        is_summary: bool,
        answers: Vec<Answer>,
    ) -> Self {
        Self {
            id,
            cycle_id,
            from_username,
            to_username,
            is_summary,
            answers,
        }
    }

    pub fn id(&self) -> FormId {
        self.id
    }

    pub fn cycle_id(&self) -> CycleId {
        self.cycle_id
    }

    pub fn from_username(&self) -> &Username {
        &self.from_username
    }

    pub fn to_username(&self) -> &Username {
        &self.to_username
    }

    pub fn is_summary(&self) -> bool {
        self.is_summary
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn answer_for(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    pub fn answer(&self, answer_id: AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == answer_id)
    }

    /// Replaces the content of an existing answer. Returns false if the
    /// answer id is not on this form.
    pub fn set_content(&mut self, answer_id: AnswerId, content: impl Into<String>) -> bool {
        match self.answers.iter_mut().find(|a| a.id == answer_id) {
            Some(answer) => {
                answer.content = content.into();
                true
            }
            None => false,
        }
    }
}

/// The summary already stored for a recipient in a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingSummary {
    pub form_id: FormId,
    pub author: Username,
}

impl From<&Form> for ExistingSummary {
    fn from(form: &Form) -> Self {
        Self {
            form_id: form.id(),
            author: form.from_username().clone(),
        }
    }
}

impl Validatable for Form {
    type Context = Option<ExistingSummary>;

    /// Any write for a recipient is refused once someone else's summary
    /// exists for them in the cycle. Rewriting that summary itself is allowed.
    fn validate(&self, existing: &Option<ExistingSummary>) -> Result<(), DomainError> {
        match existing {
            Some(summary) if summary.form_id != self.id => Err(DomainError::new(
                ErrorCode::SummaryExists,
                format!(
                    "Existing summary form {} for {} in cycle {} was created by {}; edit that summary instead",
                    summary.form_id, self.to_username, self.cycle_id, summary.author
                ),
            )
            .with_detail("form_id", summary.form_id.to_string())
            .with_detail("author", summary.author.as_str())),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    fn contribution() -> Form {
        let answers = vec![Answer::new(QuestionId::new(), "good work")];
        Form::new(CycleId::new(), user("alice"), user("bob"), false, answers).unwrap()
    }

    #[test]
    fn form_rejects_self_feedback() {
        let result = Form::new(CycleId::new(), user("alice"), user("alice"), false, vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn set_content_updates_known_answer_only() {
        let mut form = contribution();
        let answer_id = form.answers()[0].id;

        assert!(form.set_content(answer_id, "better work"));
        assert_eq!(form.answer(answer_id).unwrap().content, "better work");
        assert!(!form.set_content(AnswerId::new(), "ignored"));
    }

    #[test]
    fn validate_passes_without_existing_summary() {
        assert!(contribution().validate(&None).is_ok());
    }

    #[test]
    fn validate_allows_rewriting_the_same_summary() {
        let summary = Form::new(CycleId::new(), user("manager"), user("bob"), true, vec![]).unwrap();
        let existing = Some(ExistingSummary::from(&summary));
        assert!(summary.validate(&existing).is_ok());
    }

    #[test]
    fn validate_names_existing_author_and_id() {
        let first = Form::new(CycleId::new(), user("manager"), user("bob"), true, vec![]).unwrap();
        let second = Form::new(first.cycle_id(), user("other"), user("bob"), true, vec![]).unwrap();

        let err = second
            .validate(&Some(ExistingSummary::from(&first)))
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::SummaryExists);
        assert!(err.message.contains("manager"));
        assert!(err.message.contains(&first.id().to_string()));
        assert_eq!(err.detail("author"), Some("manager"));
    }

    #[test]
    fn validate_blocks_contributions_once_summarised() {
        let summary = Form::new(CycleId::new(), user("manager"), user("bob"), true, vec![]).unwrap();
        let err = contribution()
            .validate(&Some(ExistingSummary::from(&summary)))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SummaryExists);
    }
}
