//! Per-cycle record of which broadcasts have gone out.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::MessageCode;

/// Send state of one broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "at", rename_all = "snake_case")]
pub enum NotificationState {
    NotSent,
    Sent(Timestamp),
}

impl NotificationState {
    pub fn from_last_sent(last_sent: Option<Timestamp>) -> Self {
        match last_sent {
            Some(at) => NotificationState::Sent(at),
            None => NotificationState::NotSent,
        }
    }

    /// Whether a send may proceed.
    pub fn should_send(&self, force: bool) -> bool {
        force || matches!(self, NotificationState::NotSent)
    }

    pub fn mark_sent(self, at: Timestamp) -> Self {
        NotificationState::Sent(at)
    }

    pub fn last_sent(&self) -> Option<Timestamp> {
        match self {
            NotificationState::NotSent => None,
            NotificationState::Sent(at) => Some(*at),
        }
    }
}

/// Result of trying to claim a broadcast slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The slot was taken; the caller must deliver.
    Claimed { previous: Option<Timestamp> },
    /// Someone already sent it and `force` was not given.
    AlreadySent { at: Timestamp },
}

impl ClaimOutcome {
    pub fn is_claimed(&self) -> bool {
        matches!(self, ClaimOutcome::Claimed { .. })
    }
}

/// Last-sent timestamps for all seven codes of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastLog {
    last_sent: [Option<Timestamp>; 7],
}

impl BroadcastLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the log from stored columns, ordered as [`MessageCode::ALL`].
    pub fn from_columns(last_sent: [Option<Timestamp>; 7]) -> Self {
        Self { last_sent }
    }

    pub fn columns(&self) -> [Option<Timestamp>; 7] {
        self.last_sent
    }

    pub fn state(&self, code: MessageCode) -> NotificationState {
        NotificationState::from_last_sent(self.last_sent[code.index()])
    }

    pub fn last_sent(&self, code: MessageCode) -> Option<Timestamp> {
        self.last_sent[code.index()]
    }

    /// Compare-and-set on the slot for `code`.
    ///
    /// Claims when nothing was sent yet or when `force` is given; the slot
    /// then holds `at`.
    pub fn claim(&mut self, code: MessageCode, at: Timestamp, force: bool) -> ClaimOutcome {
        let state = self.state(code);
        if !state.should_send(force) {
            if let NotificationState::Sent(previous) = state {
                return ClaimOutcome::AlreadySent { at: previous };
            }
        }
        self.last_sent[code.index()] = state.mark_sent(at).last_sent();
        ClaimOutcome::Claimed {
            previous: state.last_sent(),
        }
    }
}
