//! PostgreSQL implementation of EnrollmentRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::enrollment::{Enrollment, ExternalInvite, InviteOutcome};
use crate::domain::foundation::{CycleId, DomainError, ErrorCode, Username};
use crate::ports::EnrollmentRepository;

use super::{db_error, parse_username};

/// PostgreSQL implementation of the EnrollmentRepository port.
pub struct PostgresEnrollmentRepository {
    pool: PgPool,
}

impl PostgresEnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentRepository for PostgresEnrollmentRepository {
    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        // The primary key is the uniqueness check; ON CONFLICT turns a
        // concurrent second insert into a zero-row result instead of an abort.
        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (cycle_id, username, enrolled_at)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT enrollments_pkey DO NOTHING
            "#,
        )
        .bind(enrollment.cycle_id.as_uuid())
        .bind(enrollment.username.as_str())
        .bind(enrollment.enrolled_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("enrollments_cycle_id_fkey") {
                    return DomainError::new(
                        ErrorCode::CycleNotFound,
                        format!("Cycle not found: {}", enrollment.cycle_id),
                    );
                }
            }
            db_error("Failed to insert enrollment", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AlreadyEnrolled,
                format!(
                    "{} is already enrolled in cycle {}",
                    enrollment.username, enrollment.cycle_id
                ),
            ));
        }

        Ok(())
    }

    async fn is_enrolled(&self, cycle_id: &CycleId, username: &Username) -> Result<bool, DomainError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE cycle_id = $1 AND username = $2)",
        )
        .bind(cycle_id.as_uuid())
        .bind(username.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check enrollment", e))?;

        Ok(exists)
    }

    async fn list_enrolled(&self, cycle_id: &CycleId) -> Result<Vec<Username>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT username FROM enrollments WHERE cycle_id = $1 ORDER BY username",
        )
        .bind(cycle_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list enrollments", e))?;

        rows.into_iter().map(|(name,)| parse_username(name)).collect()
    }

    async fn invite(&self, invite: &ExternalInvite) -> Result<InviteOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO external_invites (cycle_id, inviter, invitee, invited_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ON CONSTRAINT external_invites_pkey DO NOTHING
            "#,
        )
        .bind(invite.cycle_id.as_uuid())
        .bind(invite.inviter.as_str())
        .bind(invite.invitee.as_str())
        .bind(invite.invited_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert invite", e))?;

        Ok(if result.rows_affected() == 0 {
            InviteOutcome::AlreadyInvited
        } else {
            InviteOutcome::Created
        })
    }

    async fn is_invited(
        &self,
        cycle_id: &CycleId,
        inviter: &Username,
        invitee: &Username,
    ) -> Result<bool, DomainError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM external_invites
                WHERE cycle_id = $1 AND inviter = $2 AND invitee = $3
            )
            "#,
        )
        .bind(cycle_id.as_uuid())
        .bind(inviter.as_str())
        .bind(invitee.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check invite", e))?;

        Ok(exists)
    }

    async fn list_inviters(&self, cycle_id: &CycleId, invitee: &Username) -> Result<Vec<Username>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT inviter FROM external_invites WHERE cycle_id = $1 AND invitee = $2 ORDER BY inviter",
        )
        .bind(cycle_id.as_uuid())
        .bind(invitee.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list inviters", e))?;

        rows.into_iter().map(|(name,)| parse_username(name)).collect()
    }
}
