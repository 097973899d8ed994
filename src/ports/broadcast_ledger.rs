//! Broadcast ledger port.
//!
//! The scheduled job and an operator's forced send can race. The ledger
//! closes that race with a single conditional write on the last-sent slot.

use async_trait::async_trait;

use crate::domain::foundation::{CycleId, DomainError, Timestamp};
use crate::domain::notification::{ClaimOutcome, MessageCode};

/// Compare-and-set access to a cycle's broadcast timestamps.
#[async_trait]
pub trait BroadcastLedger: Send + Sync {
    /// Atomically claim the slot for `code` on `cycle_id`.
    ///
    /// Succeeds when the slot is empty or `force` is set, storing `at`.
    /// Of N concurrent non-forced claims on an empty slot exactly one wins.
    ///
    /// # Errors
    ///
    /// - `CycleNotFound` if the cycle doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn claim(
        &self,
        cycle_id: &CycleId,
        code: MessageCode,
        at: Timestamp,
        force: bool,
    ) -> Result<ClaimOutcome, DomainError>;
}
