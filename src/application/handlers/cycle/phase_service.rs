//! PhaseService - resolves the current cycle and its phase for a caller.
//!
//! Every handler that gates an operation on the phase goes through here, so
//! the phase is recomputed per call and never cached.

use std::sync::Arc;

use tracing::debug;

use crate::domain::cycle::{Cycle, CycleSelection, DisplayPolicy, Phase, PhaseClock};
use crate::domain::errors::FeedbackError;
use crate::domain::foundation::{CycleId, ErrorCode, Timestamp};
use crate::ports::CycleRepository;

/// A cycle together with the phase it is in for one observer.
#[derive(Debug, Clone)]
pub struct CyclePhase {
    pub cycle: Cycle,
    pub phase: Phase,
}

/// Shared phase lookups used by the feedback handlers.
pub struct PhaseService {
    cycle_repository: Arc<dyn CycleRepository>,
    clock: PhaseClock,
    selection: CycleSelection,
    display: DisplayPolicy,
}

impl PhaseService {
    pub fn new(
        cycle_repository: Arc<dyn CycleRepository>,
        clock: PhaseClock,
        selection: CycleSelection,
        display: DisplayPolicy,
    ) -> Self {
        Self {
            cycle_repository,
            clock,
            selection,
            display,
        }
    }

    pub fn clock(&self) -> &PhaseClock {
        &self.clock
    }

    /// Phase of `cycle` for someone in `location`.
    pub fn phase(&self, cycle: &Cycle, location: Option<&str>, now: Timestamp) -> Phase {
        self.clock.phase(cycle, location, now)
    }

    /// The cycle the organisation is currently working in.
    ///
    /// Fails with a configuration error when no cycle enrolls within the
    /// lookahead window.
    pub async fn current_cycle(&self, now: Timestamp) -> Result<Cycle, FeedbackError> {
        let candidates = self
            .cycle_repository
            .list_enrolling_before(self.selection.horizon(now))
            .await?;
        let cycle = self.selection.select(&candidates, now)?;
        Ok(cycle.clone())
    }

    /// The current cycle and its phase for someone in `location`.
    pub async fn current(&self, location: Option<&str>, now: Timestamp) -> Result<CyclePhase, FeedbackError> {
        let cycle = self.current_cycle(now).await?;
        let phase = self.phase(&cycle, location, now);
        debug!(cycle = %cycle.name(), phase = %phase, "Current phase resolved");
        Ok(CyclePhase { cycle, phase })
    }

    /// A specific cycle and its phase for someone in `location`.
    pub async fn phase_of(
        &self,
        cycle_id: &CycleId,
        location: Option<&str>,
        now: Timestamp,
    ) -> Result<CyclePhase, FeedbackError> {
        let cycle = self
            .cycle_repository
            .find_by_id(cycle_id)
            .await?
            .ok_or_else(|| {
                FeedbackError::not_found(ErrorCode::CycleNotFound, format!("Cycle not found: {}", cycle_id))
            })?;
        let phase = self.phase(&cycle, location, now);
        Ok(CyclePhase { cycle, phase })
    }

    /// Resolves `cycle_id` when given, otherwise the current cycle.
    pub async fn resolve(
        &self,
        cycle_id: Option<&CycleId>,
        location: Option<&str>,
        now: Timestamp,
    ) -> Result<CyclePhase, FeedbackError> {
        match cycle_id {
            Some(id) => self.phase_of(id, location, now).await,
            None => self.current(location, now).await,
        }
    }

    /// Formats a boundary for display in the observer's zone.
    pub fn render(&self, boundary: Timestamp, location: Option<&str>) -> String {
        self.display.render(boundary, self.clock.zones().resolve(location))
    }

    /// Rejects `operation` unless the phase lies within `first..=last`.
    ///
    /// The error carries the boundary the observer is waiting for: when the
    /// window opens if it is still ahead, when it closed otherwise.
    pub fn require(
        &self,
        operation: &str,
        current: &CyclePhase,
        location: Option<&str>,
        first: Phase,
        last: Phase,
    ) -> Result<(), FeedbackError> {
        let actual = current.phase;
        if actual >= first && actual <= last {
            return Ok(());
        }

        let boundaries = current.cycle.boundaries();
        let (expected, boundary) = if actual < first {
            let opens = boundaries
                .start_of(first)
                .map(|at| format!("opens {}", self.render(at, location)));
            (first, opens)
        } else {
            let closed = boundaries
                .end_of(last)
                .map(|at| format!("closed {}", self.render(at, location)));
            (last, closed)
        };

        Err(FeedbackError::phase_mismatch(
            operation,
            expected,
            actual,
            boundary.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryFeedbackStore;
    use crate::domain::cycle::CycleBoundaries;
    use crate::domain::foundation::TemplateId;
    use chrono::{TimeZone, Utc};

    fn ts(m: u32, d: u32, h: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, m, d, h, 0, 0).unwrap())
    }

    fn cycle(name: &str, start_month: u32) -> Cycle {
        let b = CycleBoundaries::new(
            ts(start_month, 1, 18),
            ts(start_month, 8, 18),
            ts(start_month, 15, 18),
            ts(start_month, 22, 18),
        )
        .unwrap();
        Cycle::new(name, TemplateId::new(), b).unwrap()
    }

    async fn service_with(cycles: &[Cycle]) -> PhaseService {
        let store = InMemoryFeedbackStore::new();
        for c in cycles {
            CycleRepository::save(&store, c).await.unwrap();
        }
        PhaseService::new(
            Arc::new(store),
            PhaseClock::default(),
            CycleSelection::default(),
            DisplayPolicy::default(),
        )
    }

    #[tokio::test]
    async fn current_picks_latest_started_cycle() {
        let march = cycle("2024 Mar", 3);
        let june = cycle("2024 Jun", 6);
        let service = service_with(&[march.clone(), june.clone()]).await;

        let current = service.current(None, ts(6, 10, 12)).await.unwrap();
        assert_eq!(current.cycle.id(), june.id());
        assert_eq!(current.phase, Phase::Entry);
    }

    #[tokio::test]
    async fn no_cycles_is_a_configuration_error() {
        let service = service_with(&[]).await;
        let err = service.current(None, ts(6, 10, 12)).await.unwrap_err();
        assert!(matches!(err, FeedbackError::Configuration(_)));
    }

    #[tokio::test]
    async fn phase_of_unknown_cycle_is_not_found() {
        let service = service_with(&[]).await;
        let err = service.phase_of(&CycleId::new(), None, ts(6, 10, 12)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CycleNotFound);
    }

    #[tokio::test]
    async fn require_before_window_names_opening_boundary() {
        let march = cycle("2024 Mar", 3);
        let service = service_with(&[march]).await;
        let current = service.current(None, ts(3, 3, 12)).await.unwrap();
        assert_eq!(current.phase, Phase::Enrollment);

        let err = service
            .require("give feedback", &current, None, Phase::Entry, Phase::Entry)
            .unwrap_err();
        match err {
            FeedbackError::PhaseMismatch { expected, actual, boundary, .. } => {
                assert_eq!(expected, Phase::Entry);
                assert_eq!(actual, Phase::Enrollment);
                assert!(boundary.starts_with("opens "), "{}", boundary);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn require_after_window_names_closing_boundary() {
        let march = cycle("2024 Mar", 3);
        let service = service_with(&[march]).await;
        let current = service.current(None, ts(3, 10, 12)).await.unwrap();
        assert_eq!(current.phase, Phase::Entry);

        let err = service
            .require("enroll", &current, None, Phase::Enrollment, Phase::Enrollment)
            .unwrap_err();
        match err {
            FeedbackError::PhaseMismatch { expected, boundary, .. } => {
                assert_eq!(expected, Phase::Enrollment);
                assert!(boundary.starts_with("closed "), "{}", boundary);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn require_accepts_any_phase_in_range() {
        let march = cycle("2024 Mar", 3);
        let service = service_with(&[march]).await;
        let current = service.current(None, ts(3, 25, 12)).await.unwrap();
        assert_eq!(current.phase, Phase::Review);
        assert!(service
            .require("view summary", &current, None, Phase::Approval, Phase::Review)
            .is_ok());
    }
}
