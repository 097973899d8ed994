//! Read model for rendering a contribution or summary form.

use serde::Serialize;

use crate::domain::cycle::QuestionTemplate;
use crate::domain::foundation::{AnswerId, QuestionId};

use super::{Form, PooledAnswers};

/// One question on a rendered form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormItem {
    pub question_id: QuestionId,
    pub caption: String,
    pub question: String,
    /// Pooled contributions, only while no summary has been written.
    pub raw_answer: Option<String>,
    pub answer_id: Option<AnswerId>,
    pub answer: String,
}

/// A form as shown to its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub recipient_display_name: String,
    pub cycle_name: String,
    pub end_date: String,
    pub read_only: bool,
    pub items: Vec<FormItem>,
}

impl FormView {
    /// Builds items in template order.
    ///
    /// Stored answers win. Without a stored form, pooled contributions (when
    /// given) seed both the raw text and the editable answer.
    pub fn build(
        template: &QuestionTemplate,
        cycle_name: &str,
        recipient_display_name: &str,
        form: Option<&Form>,
        pooled: Option<&PooledAnswers>,
        end_date: String,
        read_only: bool,
    ) -> Self {
        let items = template
            .questions()
            .iter()
            .map(|question| {
                let stored = form.and_then(|f| f.answer_for(question.id));
                let raw_answer = match (form, pooled) {
                    (None, Some(pool)) => Some(pool.pooled_text(question.id)),
                    _ => None,
                };
                let answer = match stored {
                    Some(a) => a.content.clone(),
                    None => raw_answer.clone().unwrap_or_default(),
                };
                FormItem {
                    question_id: question.id,
                    caption: question.caption.clone(),
                    question: question.prompt_for(recipient_display_name, cycle_name),
                    raw_answer,
                    answer_id: stored.map(|a| a.id),
                    answer,
                }
            })
            .collect();

        Self {
            recipient_display_name: recipient_display_name.to_string(),
            cycle_name: cycle_name.to_string(),
            end_date,
            read_only,
            items,
        }
    }
}
