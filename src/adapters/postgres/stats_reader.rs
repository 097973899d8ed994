//! PostgreSQL implementation of StatsReader.
//!
//! One query computes the usernames × cycles cross product with correlated
//! counts, so every pair comes back even when nothing was written for it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{CycleId, DomainError, Timestamp, Username};
use crate::domain::stats::ParticipationFacts;
use crate::ports::StatsReader;

use super::{db_error, parse_username};

/// PostgreSQL implementation of the StatsReader port.
pub struct PostgresStatsReader {
    pool: PgPool,
}

impl PostgresStatsReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ParticipationRow {
    username: String,
    cycle_id: Uuid,
    cycle_name: String,
    enroll_start: DateTime<Utc>,
    contributed: i64,
    received: i64,
    enrolled: bool,
    has_summary: bool,
}

impl TryFrom<ParticipationRow> for ParticipationFacts {
    type Error = DomainError;

    fn try_from(row: ParticipationRow) -> Result<Self, Self::Error> {
        Ok(ParticipationFacts {
            username: parse_username(row.username)?,
            cycle_id: CycleId::from_uuid(row.cycle_id),
            cycle_name: row.cycle_name,
            enroll_start: Timestamp::from_datetime(row.enroll_start),
            contributed: row.contributed,
            received: row.received,
            enrolled: row.enrolled,
            has_summary: row.has_summary,
        })
    }
}

#[async_trait]
impl StatsReader for PostgresStatsReader {
    async fn participation(&self, usernames: &[Username]) -> Result<Vec<ParticipationFacts>, DomainError> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let names: Vec<String> = usernames.iter().map(|u| u.as_str().to_string()).collect();

        let rows: Vec<ParticipationRow> = sqlx::query_as(
            r#"
            WITH people AS (SELECT DISTINCT UNNEST($1::text[]) AS username)
            SELECT
                p.username,
                c.id AS cycle_id,
                c.name AS cycle_name,
                c.enroll_start,
                (SELECT COUNT(*) FROM forms f
                    WHERE f.cycle_id = c.id AND f.from_username = p.username AND NOT f.is_summary
                ) AS contributed,
                (SELECT COUNT(*) FROM forms f
                    WHERE f.cycle_id = c.id AND f.to_username = p.username AND NOT f.is_summary
                ) AS received,
                EXISTS (SELECT 1 FROM enrollments e
                    WHERE e.cycle_id = c.id AND e.username = p.username
                ) AS enrolled,
                EXISTS (SELECT 1 FROM forms f
                    WHERE f.cycle_id = c.id AND f.to_username = p.username AND f.is_summary
                ) AS has_summary
            FROM people p
            CROSS JOIN cycles c
            ORDER BY c.enroll_start ASC, p.username ASC
            "#,
        )
        .bind(&names)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to compute participation", e))?;

        rows.into_iter().map(ParticipationFacts::try_from).collect()
    }
}
