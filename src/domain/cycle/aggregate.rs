//! Cycle aggregate - one recurring round of peer feedback.
//!
//! A cycle is a named window split by four ordered boundaries into the
//! enrollment, entry, approval and review phases. It also carries the
//! broadcast log that records when each announcement was last sent.

use crate::domain::foundation::{CycleId, TemplateId, Timestamp, ValidationError};
use crate::domain::notification::{BroadcastLog, ClaimOutcome, MessageCode};

use super::Phase;

/// Maximum length of a cycle name.
pub const CYCLE_NAME_MAX_LEN: usize = 16;

/// The four ordered boundaries of a cycle.
///
/// Stored values are wall-clock times; they are re-read in the observer's
/// timezone before being compared against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBoundaries {
    enroll_start: Timestamp,
    entry_start: Timestamp,
    approval_start: Timestamp,
    approval_end: Timestamp,
}

impl CycleBoundaries {
    /// Creates boundaries, requiring strictly increasing order.
    pub fn new(
        enroll_start: Timestamp,
        entry_start: Timestamp,
        approval_start: Timestamp,
        approval_end: Timestamp,
    ) -> Result<Self, ValidationError> {
        let ordered = [
            ("entry_start", enroll_start, entry_start),
            ("approval_start", entry_start, approval_start),
            ("approval_end", approval_start, approval_end),
        ];
        for (field, earlier, later) in ordered {
            if !earlier.is_before(&later) {
                return Err(ValidationError::invalid_format(
                    field,
                    "boundaries must be strictly increasing: enroll_start < entry_start < approval_start < approval_end",
                ));
            }
        }
        Ok(Self {
            enroll_start,
            entry_start,
            approval_start,
            approval_end,
        })
    }

    pub fn enroll_start(&self) -> Timestamp {
        self.enroll_start
    }

    pub fn entry_start(&self) -> Timestamp {
        self.entry_start
    }

    pub fn approval_start(&self) -> Timestamp {
        self.approval_start
    }

    pub fn approval_end(&self) -> Timestamp {
        self.approval_end
    }

    /// Boundary at which the phase begins.
    pub fn start_of(&self, phase: Phase) -> Option<Timestamp> {
        match phase {
            Phase::Inactive => None,
            Phase::Enrollment => Some(self.enroll_start),
            Phase::Entry => Some(self.entry_start),
            Phase::Approval => Some(self.approval_start),
            Phase::Review => Some(self.approval_end),
        }
    }

    /// Boundary at which the phase ends. Review never ends.
    pub fn end_of(&self, phase: Phase) -> Option<Timestamp> {
        match phase {
            Phase::Inactive => Some(self.enroll_start),
            Phase::Enrollment => Some(self.entry_start),
            Phase::Entry => Some(self.approval_start),
            Phase::Approval => Some(self.approval_end),
            Phase::Review => None,
        }
    }
}

/// The Cycle aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    id: CycleId,
    name: String,
    template_id: TemplateId,
    boundaries: CycleBoundaries,
    broadcasts: BroadcastLog,
}

impl Cycle {
    /// Creates a new cycle with an empty broadcast log.
    pub fn new(
        name: impl Into<String>,
        template_id: TemplateId,
        boundaries: CycleBoundaries,
    ) -> Result<Self, ValidationError> {
        let name = Self::validate_name(name.into())?;
        Ok(Self {
            id: CycleId::new(),
            name,
            template_id,
            boundaries,
            broadcasts: BroadcastLog::new(),
        })
    }

    /// Reconstitutes a cycle from persisted data.
    pub fn reconstitute(
        id: CycleId,
        name: String,
        template_id: TemplateId,
        boundaries: CycleBoundaries,
        broadcasts: BroadcastLog,
    ) -> Self {
        Self {
            id,
            name,
            template_id,
            boundaries,
            broadcasts,
        }
    }

    fn validate_name(name: String) -> Result<String, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if trimmed.chars().count() > CYCLE_NAME_MAX_LEN {
            return Err(ValidationError::invalid_format(
                "name",
                format!("longer than {} characters", CYCLE_NAME_MAX_LEN),
            ));
        }
        Ok(trimmed.to_string())
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> CycleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template_id(&self) -> TemplateId {
        self.template_id
    }

    pub fn boundaries(&self) -> &CycleBoundaries {
        &self.boundaries
    }

    pub fn broadcasts(&self) -> &BroadcastLog {
        &self.broadcasts
    }

    // ───────────────────────────────────────────────────────────────
    // Mutations
    // ───────────────────────────────────────────────────────────────

    /// Replaces the boundaries. The broadcast log is kept.
    pub fn reschedule(&mut self, boundaries: CycleBoundaries) {
        self.boundaries = boundaries;
    }

    /// Claims the broadcast slot for `code`, see [`BroadcastLog::claim`].
    pub fn claim_broadcast(&mut self, code: MessageCode, at: Timestamp, force: bool) -> ClaimOutcome {
        self.broadcasts.claim(code, at, force)
    }
}
