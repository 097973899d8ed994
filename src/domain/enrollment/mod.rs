//! Enrollment module - opting into a cycle and inviting outside reviewers.
//!
//! An employee receives feedback in a cycle only if they enrolled during its
//! enrollment phase. During entry, an enrolled employee may also invite
//! someone outside their usual circle to contribute.

use crate::domain::foundation::{CycleId, Timestamp, Username, ValidationError};

/// An employee's opt-in for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub cycle_id: CycleId,
    pub username: Username,
    pub enrolled_at: Timestamp,
}

impl Enrollment {
    pub fn new(cycle_id: CycleId, username: Username, enrolled_at: Timestamp) -> Self {
        Self {
            cycle_id,
            username,
            enrolled_at,
        }
    }
}

/// Permission for `invitee` to write feedback for `inviter` in a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalInvite {
    pub cycle_id: CycleId,
    /// The enrolled employee asking for feedback.
    pub inviter: Username,
    /// The person invited to contribute.
    pub invitee: Username,
    pub invited_at: Timestamp,
}

impl ExternalInvite {
    /// Creates an invite. Nobody can invite themselves.
    pub fn new(
        cycle_id: CycleId,
        inviter: Username,
        invitee: Username,
        invited_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        if inviter == invitee {
            return Err(ValidationError::invalid_format(
                "invitee",
                "cannot invite yourself",
            ));
        }
        Ok(Self {
            cycle_id,
            inviter,
            invitee,
            invited_at,
        })
    }
}

/// Whether an invite write created a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteOutcome {
    Created,
    AlreadyInvited,
}
