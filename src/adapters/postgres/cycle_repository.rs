//! PostgreSQL implementation of CycleRepository.
//!
//! Inserts and boundary updates run the overlap check inside the same
//! transaction as the write. The table is locked in SHARE ROW EXCLUSIVE mode
//! first, so two writers cannot both see a free window and then both commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::cycle::{Cycle, CycleBoundaries, CycleNeighbours};
use crate::domain::foundation::{
    CycleId, DomainError, ErrorCode, TemplateId, Timestamp, Validatable,
};
use crate::domain::notification::BroadcastLog;
use crate::ports::CycleRepository;

use super::db_error;

const CYCLE_COLUMNS: &str = r#"
    id, name, template_id, enroll_start, entry_start, approval_start, approval_end,
    ust01_last_sent, ust02_last_sent, ust03_last_sent, ust04_last_sent,
    ust05_last_sent, ust06_last_sent, ust07_last_sent
"#;

/// PostgreSQL implementation of the CycleRepository port.
pub struct PostgresCycleRepository {
    pool: PgPool,
}

impl PostgresCycleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a cycle.
#[derive(Debug, sqlx::FromRow)]
struct CycleRow {
    id: Uuid,
    name: String,
    template_id: Uuid,
    enroll_start: DateTime<Utc>,
    entry_start: DateTime<Utc>,
    approval_start: DateTime<Utc>,
    approval_end: DateTime<Utc>,
    ust01_last_sent: Option<DateTime<Utc>>,
    ust02_last_sent: Option<DateTime<Utc>>,
    ust03_last_sent: Option<DateTime<Utc>>,
    ust04_last_sent: Option<DateTime<Utc>>,
    ust05_last_sent: Option<DateTime<Utc>>,
    ust06_last_sent: Option<DateTime<Utc>>,
    ust07_last_sent: Option<DateTime<Utc>>,
}

impl TryFrom<CycleRow> for Cycle {
    type Error = DomainError;

    fn try_from(row: CycleRow) -> Result<Self, Self::Error> {
        let boundaries = CycleBoundaries::new(
            Timestamp::from_datetime(row.enroll_start),
            Timestamp::from_datetime(row.entry_start),
            Timestamp::from_datetime(row.approval_start),
            Timestamp::from_datetime(row.approval_end),
        )
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid boundaries stored for cycle {}: {}", row.name, e),
            )
        })?;

        let broadcasts = BroadcastLog::from_columns(
            [
                row.ust01_last_sent,
                row.ust02_last_sent,
                row.ust03_last_sent,
                row.ust04_last_sent,
                row.ust05_last_sent,
                row.ust06_last_sent,
                row.ust07_last_sent,
            ]
            .map(|sent| sent.map(Timestamp::from_datetime)),
        );

        Ok(Cycle::reconstitute(
            CycleId::from_uuid(row.id),
            row.name,
            TemplateId::from_uuid(row.template_id),
            boundaries,
            broadcasts,
        ))
    }
}

/// Maps unique/check constraint violations on `cycles` to descriptive errors.
fn map_write_error(cycle: &Cycle, action: &str, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.constraint() {
            Some("cycles_name_key") => {
                return DomainError::new(
                    ErrorCode::DuplicateCycleName,
                    format!("A cycle named {} already exists", cycle.name()),
                );
            }
            Some("cycles_boundaries_ordered") => {
                return DomainError::validation("boundaries", "Cycle boundaries must be strictly ordered");
            }
            _ => {}
        }
    }
    db_error(action, e)
}

impl PostgresCycleRepository {
    /// Loads the nearest neighbours of `cycle` by approval end and runs the
    /// overlap rule. Must be called after the table lock is taken.
    async fn check_overlap(
        tx: &mut Transaction<'_, Postgres>,
        cycle: &Cycle,
    ) -> Result<(), DomainError> {
        let end = *cycle.boundaries().approval_end().as_datetime();

        let previous: Option<CycleRow> = sqlx::query_as(&format!(
            r#"
            SELECT {CYCLE_COLUMNS} FROM cycles
            WHERE approval_end <= $1 AND id <> $2 AND name <> $3
            ORDER BY approval_end DESC
            LIMIT 1
            "#
        ))
        .bind(end)
        .bind(cycle.id().as_uuid())
        .bind(cycle.name())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to load previous cycle", e))?;

        let next: Option<CycleRow> = sqlx::query_as(&format!(
            r#"
            SELECT {CYCLE_COLUMNS} FROM cycles
            WHERE approval_end > $1 AND id <> $2 AND name <> $3
            ORDER BY approval_end ASC
            LIMIT 1
            "#
        ))
        .bind(end)
        .bind(cycle.id().as_uuid())
        .bind(cycle.name())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to load next cycle", e))?;

        let neighbours = CycleNeighbours {
            previous: previous.map(Cycle::try_from).transpose()?,
            next: next.map(Cycle::try_from).transpose()?,
        };
        cycle.validate(&neighbours)
    }

    async fn lock_cycles(tx: &mut Transaction<'_, Postgres>) -> Result<(), DomainError> {
        sqlx::query("LOCK TABLE cycles IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to lock cycles", e))?;
        Ok(())
    }
}

#[async_trait]
impl CycleRepository for PostgresCycleRepository {
    async fn save(&self, cycle: &Cycle) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        Self::lock_cycles(&mut tx).await?;
        Self::check_overlap(&mut tx, cycle).await?;

        let b = cycle.boundaries();
        sqlx::query(
            r#"
            INSERT INTO cycles (id, name, template_id, enroll_start, entry_start, approval_start, approval_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(cycle.id().as_uuid())
        .bind(cycle.name())
        .bind(cycle.template_id().as_uuid())
        .bind(b.enroll_start().as_datetime())
        .bind(b.entry_start().as_datetime())
        .bind(b.approval_start().as_datetime())
        .bind(b.approval_end().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(cycle, "Failed to insert cycle", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(())
    }

    async fn update(&self, cycle: &Cycle) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        Self::lock_cycles(&mut tx).await?;
        Self::check_overlap(&mut tx, cycle).await?;

        // Broadcast columns belong to the ledger and are left untouched.
        let b = cycle.boundaries();
        let result = sqlx::query(
            r#"
            UPDATE cycles SET
                name = $2,
                template_id = $3,
                enroll_start = $4,
                entry_start = $5,
                approval_start = $6,
                approval_end = $7
            WHERE id = $1
            "#,
        )
        .bind(cycle.id().as_uuid())
        .bind(cycle.name())
        .bind(cycle.template_id().as_uuid())
        .bind(b.enroll_start().as_datetime())
        .bind(b.entry_start().as_datetime())
        .bind(b.approval_start().as_datetime())
        .bind(b.approval_end().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(cycle, "Failed to update cycle", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::CycleNotFound,
                format!("Cycle not found: {}", cycle.id()),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &CycleId) -> Result<Option<Cycle>, DomainError> {
        let row: Option<CycleRow> =
            sqlx::query_as(&format!("SELECT {CYCLE_COLUMNS} FROM cycles WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find cycle", e))?;

        row.map(Cycle::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Cycle>, DomainError> {
        let rows: Vec<CycleRow> = sqlx::query_as(&format!(
            "SELECT {CYCLE_COLUMNS} FROM cycles ORDER BY enroll_start ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list cycles", e))?;

        rows.into_iter().map(Cycle::try_from).collect()
    }

    async fn list_enrolling_before(&self, horizon: Timestamp) -> Result<Vec<Cycle>, DomainError> {
        let rows: Vec<CycleRow> = sqlx::query_as(&format!(
            "SELECT {CYCLE_COLUMNS} FROM cycles WHERE enroll_start < $1 ORDER BY enroll_start DESC"
        ))
        .bind(horizon.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list cycles", e))?;

        rows.into_iter().map(Cycle::try_from).collect()
    }
}
