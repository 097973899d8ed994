//! Pooling contributions for the summarizer.
//!
//! Answers from every contribution to a recipient are grouped by question and
//! shuffled before being joined, so that the position of a paragraph never
//! reveals who wrote it. The order is drawn fresh on every fetch.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::foundation::QuestionId;

use super::Form;

/// Contribution answers grouped by question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PooledAnswers {
    by_question: HashMap<QuestionId, Vec<String>>,
}

impl PooledAnswers {
    /// Collects non-empty answers from the given contributions.
    ///
    /// Summary forms are skipped.
    pub fn collect<'a>(contributions: impl IntoIterator<Item = &'a Form>) -> Self {
        let mut by_question: HashMap<QuestionId, Vec<String>> = HashMap::new();
        for form in contributions {
            if form.is_summary() {
                continue;
            }
            for answer in form.answers() {
                if answer.content.trim().is_empty() {
                    tracing::debug!(form_id = %form.id(), question_id = %answer.question_id, "Skipping empty answer while pooling");
                    continue;
                }
                by_question
                    .entry(answer.question_id)
                    .or_default()
                    .push(answer.content.clone());
            }
        }
        Self { by_question }
    }

    /// Shuffles each question's answers independently.
    pub fn shuffled<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        for answers in self.by_question.values_mut() {
            answers.shuffle(rng);
        }
        self
    }

    /// Answers for a question, in current order.
    pub fn answers(&self, question_id: QuestionId) -> &[String] {
        self.by_question
            .get(&question_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Newline-joined text for a question; empty when nobody answered.
    pub fn pooled_text(&self, question_id: QuestionId) -> String {
        self.answers(question_id).join("\n")
    }
}
