//! A recipient's feedback across past cycles.

use serde::Serialize;

use crate::domain::cycle::{Cycle, Phase, QuestionTemplate};

use super::Form;

/// One question and its summarised answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItem {
    pub question: String,
    pub answer: String,
}

/// What a recipient has for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    /// The cycle has not reached review.
    Pending { cycle_name: String },
    /// Not enrolled and no summary was written.
    NotRequested { cycle_name: String },
    /// Enrolled but nobody summarised.
    NoFeedback { cycle_name: String },
    /// The summary, in template order.
    Available {
        cycle_name: String,
        items: Vec<HistoryItem>,
    },
}

impl HistoryEntry {
    /// Classifies a cycle for a recipient.
    pub fn classify(
        cycle: &Cycle,
        phase: Phase,
        template: &QuestionTemplate,
        recipient_display_name: &str,
        enrolled: bool,
        summary: Option<&Form>,
    ) -> Self {
        let cycle_name = cycle.name().to_string();
        if phase != Phase::Review {
            return HistoryEntry::Pending { cycle_name };
        }
        match summary {
            None if !enrolled => HistoryEntry::NotRequested { cycle_name },
            None => HistoryEntry::NoFeedback { cycle_name },
            Some(form) => {
                let items = template
                    .questions()
                    .iter()
                    .map(|q| HistoryItem {
                        question: q.prompt_for(recipient_display_name, cycle.name()),
                        answer: form
                            .answer_for(q.id)
                            .map(|a| a.content.clone())
                            .unwrap_or_default(),
                    })
                    .collect();
                HistoryEntry::Available { cycle_name, items }
            }
        }
    }

    pub fn description(&self) -> String {
        match self {
            HistoryEntry::Pending { cycle_name } => format!("{} pending", cycle_name),
            HistoryEntry::NotRequested { cycle_name } => {
                format!("Did not request feedback for cycle {}", cycle_name)
            }
            HistoryEntry::NoFeedback { cycle_name } => {
                format!("No feedback available for cycle {}", cycle_name)
            }
            HistoryEntry::Available { cycle_name, .. } => cycle_name.clone(),
        }
    }

    pub fn enabled(&self) -> bool {
        matches!(self, HistoryEntry::Available { .. })
    }

    pub fn items(&self) -> &[HistoryItem] {
        match self {
            HistoryEntry::Available { items, .. } => items,
            _ => &[],
        }
    }
}

impl Serialize for HistoryEntry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload<'a> {
            cycle_description: String,
            enable: bool,
            items: &'a [HistoryItem],
        }

        Payload {
            cycle_description: self.description(),
            enable: self.enabled(),
            items: self.items(),
        }
        .serialize(serializer)
    }
}
