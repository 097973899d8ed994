//! Cycle phases and the clock that derives them.
//!
//! A phase is never stored. It is computed from the cycle's boundaries, the
//! current time and the observer's location, so the same cycle may be in
//! different phases for employees in different offices for a few hours.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, Timestamp};

use super::location::{effective_instant, LocationZones};
use super::Cycle;

/// Stage of a cycle.
///
/// Ordered: `Inactive < Enrollment < Entry < Approval < Review`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before enrollment opens.
    Inactive,
    /// Employees opt in.
    Enrollment,
    /// Peers write contributions.
    Entry,
    /// Managers write summaries.
    Approval,
    /// Summaries are visible to their recipients.
    Review,
}

impl Phase {
    /// All phases in chronological order.
    pub const ALL: [Phase; 5] = [
        Phase::Inactive,
        Phase::Enrollment,
        Phase::Entry,
        Phase::Approval,
        Phase::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Inactive => "inactive",
            Phase::Enrollment => "enrollment",
            Phase::Entry => "entry",
            Phase::Approval => "approval",
            Phase::Review => "review",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateMachine for Phase {
    fn can_transition_to(&self, target: &Self) -> bool {
        target > self
    }

    fn valid_transitions(&self) -> Vec<Self> {
        Phase::ALL.into_iter().filter(|p| p > self).collect()
    }
}

/// Derives a cycle's phase for an observer.
#[derive(Debug, Clone, Default)]
pub struct PhaseClock {
    zones: LocationZones,
}

impl PhaseClock {
    pub fn new(zones: LocationZones) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &LocationZones {
        &self.zones
    }

    /// Phase of `cycle` at `now` for someone in `location`.
    ///
    /// Boundaries are checked latest first and are inclusive: at exactly
    /// `entry_start` the cycle is already in entry.
    pub fn phase(&self, cycle: &Cycle, location: Option<&str>, now: Timestamp) -> Phase {
        let zone = self.zones.resolve(location);
        let b = cycle.boundaries();
        let reached = |boundary: Timestamp| now >= effective_instant(boundary, zone);

        if reached(b.approval_end()) {
            Phase::Review
        } else if reached(b.approval_start()) {
            Phase::Approval
        } else if reached(b.entry_start()) {
            Phase::Entry
        } else if reached(b.enroll_start()) {
            Phase::Enrollment
        } else {
            Phase::Inactive
        }
    }
}
