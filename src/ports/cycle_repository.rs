//! Cycle repository port.
//!
//! Cycles are shared, long-lived records. Writes must run the overlap check
//! and the write in one transaction so two operators cannot both slip in a
//! conflicting cycle.

use async_trait::async_trait;

use crate::domain::cycle::Cycle;
use crate::domain::foundation::{CycleId, DomainError, Timestamp};

/// Repository port for Cycle persistence.
///
/// Implementations must:
/// - load the neighbouring cycles and call `Validatable::validate` inside the
///   write transaction
/// - back the unique name with a storage constraint
#[async_trait]
pub trait CycleRepository: Send + Sync {
    /// Insert a new cycle.
    ///
    /// # Errors
    ///
    /// - `CycleOverlap` if it intersects a neighbouring cycle
    /// - `DuplicateCycleName` if the name is taken
    /// - `DatabaseError` on persistence failure
    async fn save(&self, cycle: &Cycle) -> Result<(), DomainError>;

    /// Persist new boundaries for an existing cycle.
    ///
    /// # Errors
    ///
    /// - `CycleNotFound` if the cycle doesn't exist
    /// - `CycleOverlap` if the new window intersects a neighbour
    /// - `DatabaseError` on persistence failure
    async fn update(&self, cycle: &Cycle) -> Result<(), DomainError>;

    /// Find a cycle by its ID.
    async fn find_by_id(&self, id: &CycleId) -> Result<Option<Cycle>, DomainError>;

    /// All cycles, oldest `enroll_start` first.
    async fn list_all(&self) -> Result<Vec<Cycle>, DomainError>;

    /// Cycles whose `enroll_start` is before `horizon`, newest first.
    async fn list_enrolling_before(&self, horizon: Timestamp) -> Result<Vec<Cycle>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CycleRepository) {}
    }
}
