//! Per-user, per-cycle participation facts.

use crate::domain::foundation::{CycleId, Timestamp, Username};

/// Marker for "never enrolled in this cycle".
pub const NOT_ENROLLED: i64 = -1;

/// Raw aggregates for one (username, cycle) pair of the cross product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipationFacts {
    pub username: Username,
    pub cycle_id: CycleId,
    pub cycle_name: String,
    pub enroll_start: Timestamp,
    /// Contributions authored.
    pub contributed: i64,
    /// Contributions addressed to the user.
    pub received: i64,
    pub enrolled: bool,
    pub has_summary: bool,
}

/// Participation as reported on dashboards and exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRow {
    pub username: Username,
    pub cycle_id: CycleId,
    pub cycle_name: String,
    pub enroll_start: Timestamp,
    pub contributed: i64,
    /// Contributions received, or [`NOT_ENROLLED`].
    pub received: i64,
    pub has_summary: bool,
}

impl StatsRow {
    pub fn is_enrolled(&self) -> bool {
        self.received != NOT_ENROLLED
    }
}

impl From<ParticipationFacts> for StatsRow {
    /// Enrollment is the authority on eligibility: without it, received is
    /// reported as [`NOT_ENROLLED`] whatever was addressed to the user.
    fn from(facts: ParticipationFacts) -> Self {
        Self {
            received: if facts.enrolled {
                facts.received
            } else {
                NOT_ENROLLED
            },
            username: facts.username,
            cycle_id: facts.cycle_id,
            cycle_name: facts.cycle_name,
            enroll_start: facts.enroll_start,
            contributed: facts.contributed,
            has_summary: facts.has_summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(enrolled: bool, received: i64) -> ParticipationFacts {
        ParticipationFacts {
            username: Username::new("jdoe").unwrap(),
            cycle_id: CycleId::new(),
            cycle_name: "2024 H1".to_string(),
            enroll_start: Timestamp::now(),
            contributed: 2,
            received,
            enrolled,
            has_summary: false,
        }
    }

    #[test]
    fn not_enrolled_reports_sentinel_even_with_forms() {
        let row = StatsRow::from(facts(false, 3));
        assert_eq!(row.received, NOT_ENROLLED);
        assert!(!row.is_enrolled());
        assert_eq!(row.contributed, 2);
    }

    #[test]
    fn enrolled_with_nothing_received_reports_zero() {
        let row = StatsRow::from(facts(true, 0));
        assert_eq!(row.received, 0);
        assert!(row.is_enrolled());
    }
}
