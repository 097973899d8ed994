//! Non-overlap rule between neighbouring cycles.
//!
//! Cycles are ordered by `approval_end`. A cycle's enrollment may not start
//! before its predecessor's approval ends, and its approval may not end after
//! its successor's enrollment starts.

use crate::domain::foundation::{DomainError, ErrorCode, Validatable};

use super::Cycle;

/// Nearest stored cycles either side of a candidate, by `approval_end`.
///
/// A cycle ending at the same instant as the candidate counts as previous,
/// which always overlaps.
#[derive(Debug, Clone, Default)]
pub struct CycleNeighbours {
    pub previous: Option<Cycle>,
    pub next: Option<Cycle>,
}

impl CycleNeighbours {
    /// Picks the neighbours of `candidate` out of `stored`.
    ///
    /// The candidate's own stored row (same id) is ignored, as is any cycle
    /// sharing its name, so an update is never compared against itself.
    pub fn locate<'a>(candidate: &Cycle, stored: impl IntoIterator<Item = &'a Cycle>) -> Self {
        let end = candidate.boundaries().approval_end();
        let mut previous: Option<&Cycle> = None;
        let mut next: Option<&Cycle> = None;

        for other in stored {
            if other.id() == candidate.id() || other.name() == candidate.name() {
                continue;
            }
            let other_end = other.boundaries().approval_end();
            if other_end <= end {
                if previous.map_or(true, |p| other_end > p.boundaries().approval_end()) {
                    previous = Some(other);
                }
            } else if other_end > end
                && next.map_or(true, |n| other_end < n.boundaries().approval_end())
            {
                next = Some(other);
            }
        }

        Self {
            previous: previous.cloned(),
            next: next.cloned(),
        }
    }
}

impl Validatable for Cycle {
    type Context = CycleNeighbours;

    fn validate(&self, neighbours: &CycleNeighbours) -> Result<(), DomainError> {
        let b = self.boundaries();
        let mut problems = Vec::new();
        let mut error_details = Vec::new();

        if let Some(previous) = &neighbours.previous {
            if previous.boundaries().approval_end() > b.enroll_start() {
                problems.push(format!(
                    "new cycle {} with enroll_start {} overlaps previous cycle {} with approval_end {}",
                    self.name(),
                    b.enroll_start().as_datetime(),
                    previous.name(),
                    previous.boundaries().approval_end().as_datetime()
                ));
                error_details.push(("previous_cycle", previous.name().to_string()));
            }
        }

        if let Some(next) = &neighbours.next {
            if next.boundaries().enroll_start() < b.approval_end() {
                problems.push(format!(
                    "new cycle {} with approval_end {} overlaps next cycle {} with enroll_start {}",
                    self.name(),
                    b.approval_end().as_datetime(),
                    next.name(),
                    next.boundaries().enroll_start().as_datetime()
                ));
                error_details.push(("next_cycle", next.name().to_string()));
            }
        }

        if problems.is_empty() {
            return Ok(());
        }

        let mut err = DomainError::new(ErrorCode::CycleOverlap, problems.join(" and "))
            .with_detail("cycle", self.name());
        for (key, value) in error_details {
            err = err.with_detail(key, value);
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::CycleBoundaries;
    use crate::domain::foundation::{TemplateId, Timestamp};
    use chrono::{TimeZone, Utc};

    fn ts(m: u32, d: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, m, d, 18, 0, 0).unwrap())
    }

    fn cycle(name: &str, start: (u32, u32), end: (u32, u32)) -> Cycle {
        let enroll = ts(start.0, start.1);
        let approval_end = ts(end.0, end.1);
        let b = CycleBoundaries::new(
            enroll,
            enroll.plus_days(7),
            enroll.plus_days(14),
            approval_end,
        )
        .unwrap();
        Cycle::new(name, TemplateId::new(), b).unwrap()
    }

    #[test]
    fn locate_picks_nearest_on_each_side() {
        let a = cycle("A", (1, 1), (2, 1));
        let b = cycle("B", (3, 1), (4, 1));
        let c = cycle("C", (5, 1), (6, 1));
        let d = cycle("D", (7, 1), (8, 1));
        let stored = vec![a, b.clone(), d, c.clone()];

        let candidate = cycle("X", (4, 5), (4, 30));
        let n = CycleNeighbours::locate(&candidate, &stored);

        assert_eq!(n.previous.map(|p| p.name().to_string()), Some("B".to_string()));
        assert_eq!(n.next.map(|p| p.name().to_string()), Some("C".to_string()));
    }

    #[test]
    fn locate_ignores_the_candidates_own_row() {
        let a = cycle("A", (1, 1), (2, 1));
        let n = CycleNeighbours::locate(&a, std::slice::from_ref(&a));
        assert!(n.previous.is_none());
        assert!(n.next.is_none());
    }

    #[test]
    fn non_overlapping_cycle_validates() {
        let candidate = cycle("X", (4, 5), (4, 30));
        let neighbours = CycleNeighbours {
            previous: Some(cycle("B", (3, 1), (4, 1))),
            next: Some(cycle("C", (5, 1), (6, 1))),
        };
        assert!(candidate.validate(&neighbours).is_ok());
    }

    #[test]
    fn touching_boundaries_are_allowed() {
        let candidate = cycle("X", (4, 1), (5, 1));
        let neighbours = CycleNeighbours {
            previous: Some(cycle("B", (3, 1), (4, 1))),
            next: Some(cycle("C", (5, 1), (6, 1))),
        };
        assert!(candidate.validate(&neighbours).is_ok());
    }

    #[test]
    fn overlap_with_previous_is_rejected() {
        let candidate = cycle("X", (3, 20), (4, 30));
        let neighbours = CycleNeighbours {
            previous: Some(cycle("B", (3, 1), (4, 1))),
            next: None,
        };
        let err = candidate.validate(&neighbours).unwrap_err();
        assert_eq!(err.code, ErrorCode::CycleOverlap);
        assert!(err.message.contains("overlaps previous cycle B"));
        assert_eq!(err.detail("previous_cycle"), Some("B"));
    }

    #[test]
    fn same_approval_end_counts_as_previous() {
        let a = cycle("A", (3, 1), (3, 22));
        let earlier = cycle("E", (1, 1), (2, 1));
        let candidate = cycle("B", (3, 5), (3, 22));

        let n = CycleNeighbours::locate(&candidate, [&earlier, &a]);
        assert_eq!(n.previous.as_ref().map(|p| p.name()), Some("A"));

        let err = candidate.validate(&n).unwrap_err();
        assert_eq!(err.code, ErrorCode::CycleOverlap);
        assert!(err.message.contains("overlaps previous cycle A"), "{}", err.message);
        assert_eq!(err.detail("previous_cycle"), Some("A"));
    }

    #[test]
    fn overlap_on_both_sides_reports_both() {
        let candidate = cycle("X", (3, 20), (5, 10));
        let neighbours = CycleNeighbours {
            previous: Some(cycle("B", (3, 1), (4, 1))),
            next: Some(cycle("C", (5, 1), (6, 1))),
        };
        let err = candidate.validate(&neighbours).unwrap_err();
        assert!(err.message.contains("overlaps previous cycle B"));
        assert!(err.message.contains(" and "));
        assert!(err.message.contains("overlaps next cycle C"));
    }
}
