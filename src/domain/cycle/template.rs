//! Question templates.
//!
//! A template is the ordered question list every form in a cycle answers.
//! Prompts may mention the recipient and the cycle through placeholders.

use std::collections::BTreeSet;

use crate::domain::foundation::{QuestionId, TemplateId, ValidationError};

/// Placeholder replaced with the recipient's display name.
pub const DISPLAY_NAME_PLACEHOLDER: &str = "{display_name}";

/// Placeholder replaced with the cycle name.
pub const CYCLE_NAME_PLACEHOLDER: &str = "{cycle_name}";

/// One question of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub caption: String,
    pub prompt: String,
}

impl Question {
    pub fn new(caption: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: QuestionId::new(),
            caption: caption.into(),
            prompt: prompt.into(),
        }
    }

    /// The prompt with placeholders filled in.
    pub fn prompt_for(&self, display_name: &str, cycle_name: &str) -> String {
        self.prompt
            .replace(DISPLAY_NAME_PLACEHOLDER, display_name)
            .replace(CYCLE_NAME_PLACEHOLDER, cycle_name)
    }
}

/// An ordered list of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionTemplate {
    id: TemplateId,
    questions: Vec<Question>,
}

impl QuestionTemplate {
    /// Creates a template. It must have at least one question and no
    /// repeated question ids.
    pub fn new(id: TemplateId, questions: Vec<Question>) -> Result<Self, ValidationError> {
        if questions.is_empty() {
            return Err(ValidationError::empty_field("questions"));
        }
        let distinct: BTreeSet<QuestionId> = questions.iter().map(|q| q.id).collect();
        if distinct.len() != questions.len() {
            return Err(ValidationError::invalid_format(
                "questions",
                "question ids must be unique",
            ));
        }
        Ok(Self { id, questions })
    }

    pub fn id(&self) -> TemplateId {
        self.id
    }

    /// Questions in display order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_ids(&self) -> BTreeSet<QuestionId> {
        self.questions.iter().map(|q| q.id).collect()
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_placeholders_are_filled() {
        let q = Question::new("Strengths", "What does {display_name} do well in {cycle_name}?");
        assert_eq!(
            q.prompt_for("Jane Doe", "2024 H1"),
            "What does Jane Doe do well in 2024 H1?"
        );
    }

    #[test]
    fn template_keeps_question_order() {
        let a = Question::new("A", "first");
        let b = Question::new("B", "second");
        let template = QuestionTemplate::new(TemplateId::new(), vec![a.clone(), b.clone()]).unwrap();
        let captions: Vec<_> = template.questions().iter().map(|q| q.caption.as_str()).collect();
        assert_eq!(captions, vec!["A", "B"]);
        assert_eq!(template.question(b.id), Some(&b));
        assert_eq!(template.question_ids().len(), 2);
    }

    #[test]
    fn empty_template_is_rejected() {
        assert!(QuestionTemplate::new(TemplateId::new(), vec![]).is_err());
    }

    #[test]
    fn duplicate_question_ids_are_rejected() {
        let a = Question::new("A", "first");
        assert!(QuestionTemplate::new(TemplateId::new(), vec![a.clone(), a]).is_err());
    }
}
