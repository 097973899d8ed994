//! Choosing the "current" cycle.
//!
//! Exactly one cycle is current at any moment. Normally it is the latest one
//! whose enrollment has opened, but a cycle announced ahead of time must not
//! hide its predecessor while that predecessor's summaries are still fresh.

use crate::domain::errors::FeedbackError;
use crate::domain::foundation::Timestamp;

use super::Cycle;

/// Default horizon for cycles announced ahead of time.
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 120;

/// Default window in which the previous cycle stays current.
pub const DEFAULT_REVIEW_GRACE_DAYS: i64 = 30;

/// Rules for selecting the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSelection {
    pub lookahead_days: i64,
    pub review_grace_days: i64,
}

impl Default for CycleSelection {
    fn default() -> Self {
        Self {
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            review_grace_days: DEFAULT_REVIEW_GRACE_DAYS,
        }
    }
}

impl CycleSelection {
    /// Cycles with `enroll_start` before this instant are candidates.
    pub fn horizon(&self, now: Timestamp) -> Timestamp {
        now.plus_days(self.lookahead_days)
    }

    /// Selects the current cycle from `candidates`.
    ///
    /// `candidates` must already be limited to cycles enrolling before
    /// [`horizon`](Self::horizon) but may be in any order.
    pub fn select<'a>(&self, candidates: &'a [Cycle], now: Timestamp) -> Result<&'a Cycle, FeedbackError> {
        let mut ordered: Vec<&Cycle> = candidates.iter().collect();
        ordered.sort_by(|a, b| {
            b.boundaries()
                .enroll_start()
                .cmp(&a.boundaries().enroll_start())
        });

        let latest = *ordered.first().ok_or_else(|| {
            FeedbackError::configuration(format!(
                "no cycle enrolls within {} days of {}",
                self.lookahead_days,
                now.as_datetime()
            ))
        })?;

        if latest.boundaries().enroll_start() <= now {
            return Ok(latest);
        }

        if let Some(previous) = ordered.get(1) {
            let since = now.duration_since(&previous.boundaries().enroll_start());
            if since.num_days() <= self.review_grace_days {
                return Ok(previous);
            }
        }

        Ok(latest)
    }
}
