//! Stats reader port (read side).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Username};
use crate::domain::stats::ParticipationFacts;

/// Read-only access to participation aggregates.
#[async_trait]
pub trait StatsReader: Send + Sync {
    /// One row per (username, cycle) over every stored cycle.
    ///
    /// Unknown usernames still produce rows (all zero, not enrolled).
    async fn participation(&self, usernames: &[Username]) -> Result<Vec<ParticipationFacts>, DomainError>;
}
