//! Broadcast message codes.
//!
//! Seven announcements exist per cycle. Four mark the start of a phase and
//! are sent by the periodic job; three are reminders that only go out when an
//! operator forces them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::cycle::Phase;
use crate::domain::foundation::ValidationError;

/// Who receives a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Every staff member.
    Employee,
    /// Staff not yet enrolled in the current cycle.
    NonEnrolled,
    /// Staff with at least one direct report.
    Manager,
    /// Staff with a summary in the current cycle.
    Summarised,
}

/// One of the seven cycle broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCode {
    EnrolStart,
    EnrolReminder,
    EntryStart,
    EntryReminder,
    ApproveStart,
    ReviewStart,
    ApproveReminder,
}

impl MessageCode {
    /// All codes, ordered by their wire code.
    pub const ALL: [MessageCode; 7] = [
        MessageCode::EnrolStart,
        MessageCode::EnrolReminder,
        MessageCode::EntryStart,
        MessageCode::EntryReminder,
        MessageCode::ApproveStart,
        MessageCode::ReviewStart,
        MessageCode::ApproveReminder,
    ];

    /// Stable wire code, also used to name the ledger columns.
    pub fn code(&self) -> &'static str {
        match self {
            MessageCode::EnrolStart => "ust01",
            MessageCode::EnrolReminder => "ust02",
            MessageCode::EntryStart => "ust03",
            MessageCode::EntryReminder => "ust04",
            MessageCode::ApproveStart => "ust05",
            MessageCode::ReviewStart => "ust06",
            MessageCode::ApproveReminder => "ust07",
        }
    }

    /// Operator-facing key.
    pub fn key(&self) -> &'static str {
        match self {
            MessageCode::EnrolStart => "enrol_start",
            MessageCode::EnrolReminder => "enrol_reminder",
            MessageCode::EntryStart => "entry_start",
            MessageCode::EntryReminder => "entry_reminder",
            MessageCode::ApproveStart => "approve_start",
            MessageCode::ReviewStart => "review_start",
            MessageCode::ApproveReminder => "approve_reminder",
        }
    }

    /// Subject line summary, before the company prefix.
    pub fn summary(&self) -> &'static str {
        match self {
            MessageCode::EnrolStart => "Opportunity to Enrol",
            MessageCode::EnrolReminder => "Opportunity to Enrol Reminder",
            MessageCode::EntryStart => "Provide Feedback",
            MessageCode::EntryReminder => "Provide Feedback Reminder",
            MessageCode::ApproveStart => "Manager Review and Schedule Feedback Discussions",
            MessageCode::ReviewStart => "Your feedback is available",
            MessageCode::ApproveReminder => {
                "Manager Review and Schedule Feedback Discussions Reminder"
            }
        }
    }

    /// Name of the message template the notifier renders.
    pub fn template(&self) -> &'static str {
        match self {
            MessageCode::EnrolStart | MessageCode::EnrolReminder => "enrol",
            MessageCode::EntryStart | MessageCode::EntryReminder => "entry",
            MessageCode::ApproveStart | MessageCode::ApproveReminder => "approve",
            MessageCode::ReviewStart => "review",
        }
    }

    pub fn audience(&self) -> Audience {
        match self {
            MessageCode::EnrolStart | MessageCode::EntryStart | MessageCode::EntryReminder => {
                Audience::Employee
            }
            MessageCode::EnrolReminder => Audience::NonEnrolled,
            MessageCode::ApproveStart | MessageCode::ApproveReminder => Audience::Manager,
            MessageCode::ReviewStart => Audience::Summarised,
        }
    }

    /// Reminders are never picked by the phase; they must be requested.
    pub fn is_reminder(&self) -> bool {
        matches!(
            self,
            MessageCode::EnrolReminder | MessageCode::EntryReminder | MessageCode::ApproveReminder
        )
    }

    /// The phase-start broadcast for `phase`, if any.
    pub fn for_phase(phase: Phase) -> Option<Self> {
        match phase {
            Phase::Inactive => None,
            Phase::Enrollment => Some(MessageCode::EnrolStart),
            Phase::Entry => Some(MessageCode::EntryStart),
            Phase::Approval => Some(MessageCode::ApproveStart),
            Phase::Review => Some(MessageCode::ReviewStart),
        }
    }

    /// Full subject line.
    pub fn subject(&self, company_name: &str) -> String {
        subject_line(company_name, self.summary())
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            MessageCode::EnrolStart => 0,
            MessageCode::EnrolReminder => 1,
            MessageCode::EntryStart => 2,
            MessageCode::EntryReminder => 3,
            MessageCode::ApproveStart => 4,
            MessageCode::ReviewStart => 5,
            MessageCode::ApproveReminder => 6,
        }
    }
}

/// Builds "{company} Feedback: {summary}".
pub fn subject_line(company_name: &str, summary: &str) -> String {
    format!("{} Feedback: {}", company_name, summary)
        .trim_start()
        .to_string()
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for MessageCode {
    type Err = ValidationError;

    /// Accepts either the wire code ("ust03") or the key ("entry_start").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        MessageCode::ALL
            .into_iter()
            .find(|c| c.code() == wanted || c.key() == wanted)
            .ok_or_else(|| {
                ValidationError::invalid_format("message_code", format!("unknown code '{}'", wanted))
            })
    }
}
