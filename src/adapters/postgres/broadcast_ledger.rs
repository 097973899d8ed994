//! PostgreSQL implementation of BroadcastLedger.
//!
//! A claim reads the code's last-sent column with `FOR UPDATE` and writes it
//! in the same transaction, so a scheduled run and a forced run racing on the
//! same cycle cannot both observe "not sent".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{CycleId, DomainError, ErrorCode, Timestamp};
use crate::domain::notification::{ClaimOutcome, MessageCode, NotificationState};
use crate::ports::BroadcastLedger;

use super::db_error;

/// PostgreSQL implementation of the BroadcastLedger port.
pub struct PostgresBroadcastLedger {
    pool: PgPool,
}

impl PostgresBroadcastLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Column holding the last-sent timestamp of `code`.
fn column_for(code: MessageCode) -> String {
    format!("{}_last_sent", code.code())
}

#[async_trait]
impl BroadcastLedger for PostgresBroadcastLedger {
    async fn claim(
        &self,
        cycle_id: &CycleId,
        code: MessageCode,
        at: Timestamp,
        force: bool,
    ) -> Result<ClaimOutcome, DomainError> {
        let column = column_for(code);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let row = sqlx::query(&format!(
            "SELECT {column} AS last_sent FROM cycles WHERE id = $1 FOR UPDATE"
        ))
        .bind(cycle_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to read broadcast state", e))?
        .ok_or_else(|| {
            DomainError::new(ErrorCode::CycleNotFound, format!("Cycle not found: {}", cycle_id))
        })?;

        let last_sent: Option<DateTime<Utc>> = row
            .try_get("last_sent")
            .map_err(|e| db_error("Failed to decode broadcast state", e))?;
        let state = NotificationState::from_last_sent(last_sent.map(Timestamp::from_datetime));

        if let (NotificationState::Sent(previous), false) = (state, state.should_send(force)) {
            tx.rollback()
                .await
                .map_err(|e| db_error("Failed to roll back transaction", e))?;
            return Ok(ClaimOutcome::AlreadySent { at: previous });
        }

        sqlx::query(&format!("UPDATE cycles SET {column} = $2 WHERE id = $1"))
            .bind(cycle_id.as_uuid())
            .bind(at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to record broadcast", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(ClaimOutcome::Claimed {
            previous: state.last_sent(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_follow_wire_codes() {
        assert_eq!(column_for(MessageCode::EnrolStart), "ust01_last_sent");
        assert_eq!(column_for(MessageCode::ApproveReminder), "ust07_last_sent");
    }
}
