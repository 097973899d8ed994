//! Dashboard layout of participation stats.
//!
//! Rows are keyed by username and sorted by display name; each row carries
//! one (contributed, received) pair per cycle in chronological order and the
//! state of the summary button for the current cycle.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::cycle::{Cycle, Phase};
use crate::domain::foundation::{CycleId, Username};
use crate::domain::profile::Profile;

use super::{StatsRow, NOT_ENROLLED};

/// What a manager can do with a report's summary this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryButtonState {
    OutsideApprovalOrReview,
    NotEnrolled,
    ReviewFeedback,
    ReviewExistingSummary,
}

impl SummaryButtonState {
    /// Button state for a row of the current cycle.
    pub fn for_row(phase: Phase, row: &StatsRow) -> Self {
        if !matches!(phase, Phase::Approval | Phase::Review) {
            SummaryButtonState::OutsideApprovalOrReview
        } else if !row.is_enrolled() {
            SummaryButtonState::NotEnrolled
        } else if row.has_summary {
            SummaryButtonState::ReviewExistingSummary
        } else {
            SummaryButtonState::ReviewFeedback
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            SummaryButtonState::OutsideApprovalOrReview => "Not in approval or review period",
            SummaryButtonState::NotEnrolled => "Not enrolled for feedback",
            SummaryButtonState::ReviewFeedback => "Review feedback",
            SummaryButtonState::ReviewExistingSummary => "Review existing summary",
        }
    }

    pub fn enabled(&self) -> bool {
        matches!(
            self,
            SummaryButtonState::ReviewFeedback | SummaryButtonState::ReviewExistingSummary
        )
    }

    pub fn has_existing_summary(&self) -> bool {
        matches!(self, SummaryButtonState::ReviewExistingSummary)
    }
}

impl Serialize for SummaryButtonState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Button {
            button_text: &'static str,
            enable: bool,
            has_existing_summary: bool,
        }

        Button {
            button_text: self.text(),
            enable: self.enabled(),
            has_existing_summary: self.has_existing_summary(),
        }
        .serialize(serializer)
    }
}

/// Counts for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleCounts {
    pub contributed: i64,
    pub received: i64,
}

/// One user's row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    pub username: Username,
    pub display_name: String,
    pub per_cycle: Vec<CycleCounts>,
    pub summary_button: Option<SummaryButtonState>,
}

/// The full dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsDashboard {
    /// Cycle names, oldest first.
    pub cycles: Vec<String>,
    pub rows: Vec<DashboardRow>,
}

/// The cycle whose summary button is shown, and its phase.
#[derive(Debug, Clone, Copy)]
pub struct CurrentCycle {
    pub id: CycleId,
    pub phase: Phase,
}

impl StatsDashboard {
    /// Lays out `rows` for `usernames` over `cycles`.
    ///
    /// Pairs missing from `rows` are reported as zero contributed and not
    /// enrolled.
    pub fn build(
        usernames: &[Username],
        cycles: &[Cycle],
        rows: Vec<StatsRow>,
        profiles: &HashMap<Username, Profile>,
        current: Option<CurrentCycle>,
    ) -> Self {
        let mut ordered_cycles: Vec<&Cycle> = cycles.iter().collect();
        ordered_cycles.sort_by_key(|c| c.boundaries().enroll_start());

        let by_pair: HashMap<(Username, CycleId), StatsRow> = rows
            .into_iter()
            .map(|row| ((row.username.clone(), row.cycle_id), row))
            .collect();

        let mut dashboard_rows: Vec<DashboardRow> = usernames
            .iter()
            .map(|username| {
                let per_cycle = ordered_cycles
                    .iter()
                    .map(|cycle| match by_pair.get(&(username.clone(), cycle.id())) {
                        Some(row) => CycleCounts {
                            contributed: row.contributed,
                            received: row.received,
                        },
                        None => CycleCounts {
                            contributed: 0,
                            received: NOT_ENROLLED,
                        },
                    })
                    .collect();

                let summary_button = current.map(|cur| {
                    match by_pair.get(&(username.clone(), cur.id)) {
                        Some(row) => SummaryButtonState::for_row(cur.phase, row),
                        None if matches!(cur.phase, Phase::Approval | Phase::Review) => {
                            SummaryButtonState::NotEnrolled
                        }
                        None => SummaryButtonState::OutsideApprovalOrReview,
                    }
                });

                DashboardRow {
                    username: username.clone(),
                    display_name: profiles
                        .get(username)
                        .map(|p| p.display_name.clone())
                        .unwrap_or_else(|| username.to_string()),
                    per_cycle,
                    summary_button,
                }
            })
            .collect();

        dashboard_rows.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.username.cmp(&b.username))
        });
        dashboard_rows.dedup_by(|a, b| a.username == b.username);

        Self {
            cycles: ordered_cycles.iter().map(|c| c.name().to_string()).collect(),
            rows: dashboard_rows,
        }
    }
}
