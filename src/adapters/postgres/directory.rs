//! PostgreSQL implementation of Directory, reading the `users` table.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, Username};
use crate::domain::profile::Profile;
use crate::ports::Directory;

use super::{db_error, parse_username};

const USER_COLUMNS: &str =
    "username, display_name, email, location, manager_username, business_unit, is_staff";

/// PostgreSQL implementation of the Directory port.
pub struct PostgresDirectory {
    pool: PgPool,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    username: String,
    display_name: String,
    email: Option<String>,
    location: Option<String>,
    manager_username: Option<String>,
    business_unit: Option<String>,
    is_staff: bool,
}

impl TryFrom<UserRow> for Profile {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            username: parse_username(row.username)?,
            display_name: row.display_name,
            location: row.location,
            manager_username: row.manager_username.map(parse_username).transpose()?,
            business_unit: row.business_unit,
            email: row.email,
            is_staff: row.is_staff,
        })
    }
}

#[async_trait]
impl Directory for PostgresDirectory {
    async fn resolve_user(&self, username: &Username) -> Result<Option<Profile>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
                .bind(username.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to resolve user", e))?;

        row.map(Profile::try_from).transpose()
    }

    async fn resolve_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to resolve user by email", e))?;

        row.map(Profile::try_from).transpose()
    }

    async fn list_staff(&self) -> Result<Vec<Profile>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_staff ORDER BY username"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list staff", e))?;

        rows.into_iter().map(Profile::try_from).collect()
    }

    async fn list_managers(&self) -> Result<Vec<Profile>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users u
            WHERE u.is_staff
              AND EXISTS (SELECT 1 FROM users r WHERE r.manager_username = u.username)
            ORDER BY u.username
            "#
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list managers", e))?;

        rows.into_iter().map(Profile::try_from).collect()
    }
}
