//! PostgreSQL implementation of FormRepository.
//!
//! Every write first locks the recipient's enrollment row, which exists
//! whether or not a summary does, so writes for one recipient in one cycle
//! run one at a time. Under that lock the summary is read and
//! `Form::validate` runs before any form row is touched. The partial unique
//! indexes on `forms` remain as a backstop.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::feedback::{Answer, ExistingSummary, Form};
use crate::domain::foundation::{
    AnswerId, CycleId, DomainError, ErrorCode, FormId, QuestionId, Username, Validatable,
};
use crate::ports::FormRepository;

use super::{db_error, parse_username};

/// PostgreSQL implementation of the FormRepository port.
pub struct PostgresFormRepository {
    pool: PgPool,
}

impl PostgresFormRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FormRow {
    id: Uuid,
    cycle_id: Uuid,
    from_username: String,
    to_username: String,
    is_summary: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct AnswerRow {
    id: Uuid,
    form_id: Uuid,
    question_id: Uuid,
    content: String,
}

fn assemble(row: FormRow, answers: Vec<Answer>) -> Result<Form, DomainError> {
    Ok(Form::reconstitute(
        FormId::from_uuid(row.id),
        CycleId::from_uuid(row.cycle_id),
        parse_username(row.from_username)?,
        parse_username(row.to_username)?,
        row.is_summary,
        answers,
    ))
}

/// Maps violations of the `forms` indexes to the conflicts they back.
fn map_form_error(form: &Form, action: &str, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.constraint() {
            Some("forms_one_summary_per_recipient") => {
                return DomainError::new(
                    ErrorCode::SummaryExists,
                    format!(
                        "A summary for {} in cycle {} was created concurrently",
                        form.to_username(),
                        form.cycle_id()
                    ),
                );
            }
            Some("forms_one_contribution_per_pair") => {
                return DomainError::new(
                    ErrorCode::FormAlreadyExists,
                    format!(
                        "{} already has feedback for {} in cycle {}",
                        form.from_username(),
                        form.to_username(),
                        form.cycle_id()
                    ),
                );
            }
            Some("answers_content_length") => {
                return DomainError::validation("answer", "Answer exceeds the character limit");
            }
            _ => {}
        }
    }
    db_error(action, e)
}

const FORM_COLUMNS: &str = "id, cycle_id, from_username, to_username, is_summary";

const LOCK_RECIPIENT: &str =
    "SELECT 1 FROM enrollments WHERE cycle_id = $1 AND username = $2 FOR UPDATE";

impl PostgresFormRepository {
    /// Attaches answers, in template order, to the given form rows.
    async fn with_answers(&self, rows: Vec<FormRow>) -> Result<Vec<Form>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let answer_rows: Vec<AnswerRow> = sqlx::query_as(
            r#"
            SELECT a.id, a.form_id, a.question_id, a.content
            FROM answers a
            JOIN forms f ON f.id = a.form_id
            JOIN cycles c ON c.id = f.cycle_id
            LEFT JOIN template_rows t
                ON t.template_id = c.template_id AND t.question_id = a.question_id
            WHERE a.form_id = ANY($1)
            ORDER BY t.position ASC NULLS LAST
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load answers", e))?;

        let mut by_form: HashMap<Uuid, Vec<Answer>> = HashMap::new();
        for a in answer_rows {
            by_form.entry(a.form_id).or_default().push(Answer {
                id: AnswerId::from_uuid(a.id),
                question_id: QuestionId::from_uuid(a.question_id),
                content: a.content,
            });
        }

        rows.into_iter()
            .map(|row| {
                let answers = by_form.remove(&row.id).unwrap_or_default();
                assemble(row, answers)
            })
            .collect()
    }

    /// Locks the recipient's enrollment, then returns their summary if any.
    async fn lock_summary(
        tx: &mut Transaction<'_, Postgres>,
        form: &Form,
    ) -> Result<Option<ExistingSummary>, DomainError> {
        let enrolled: Option<(i32,)> = sqlx::query_as(LOCK_RECIPIENT)
            .bind(form.cycle_id().as_uuid())
            .bind(form.to_username().as_str())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to lock recipient enrollment", e))?;
        if enrolled.is_none() {
            return Err(DomainError::validation(
                "to",
                format!(
                    "{} did not request feedback in cycle {}",
                    form.to_username(),
                    form.cycle_id()
                ),
            ));
        }

        let row: Option<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT id, from_username FROM forms
            WHERE cycle_id = $1 AND to_username = $2 AND is_summary
            "#,
        )
        .bind(form.cycle_id().as_uuid())
        .bind(form.to_username().as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to check existing summary", e))?;

        row.map(|(id, author)| {
            Ok(ExistingSummary {
                form_id: FormId::from_uuid(id),
                author: parse_username(author)?,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl FormRepository for PostgresFormRepository {
    async fn find_contribution(
        &self,
        cycle_id: &CycleId,
        from: &Username,
        to: &Username,
    ) -> Result<Option<Form>, DomainError> {
        let rows: Vec<FormRow> = sqlx::query_as(&format!(
            r#"
            SELECT {FORM_COLUMNS} FROM forms
            WHERE cycle_id = $1 AND from_username = $2 AND to_username = $3 AND NOT is_summary
            "#
        ))
        .bind(cycle_id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find form", e))?;

        Ok(self.with_answers(rows).await?.pop())
    }

    async fn find_summary(&self, cycle_id: &CycleId, to: &Username) -> Result<Option<Form>, DomainError> {
        let rows: Vec<FormRow> = sqlx::query_as(&format!(
            "SELECT {FORM_COLUMNS} FROM forms WHERE cycle_id = $1 AND to_username = $2 AND is_summary"
        ))
        .bind(cycle_id.as_uuid())
        .bind(to.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find summary", e))?;

        Ok(self.with_answers(rows).await?.pop())
    }

    async fn list_contributions_to(&self, cycle_id: &CycleId, to: &Username) -> Result<Vec<Form>, DomainError> {
        let rows: Vec<FormRow> = sqlx::query_as(&format!(
            "SELECT {FORM_COLUMNS} FROM forms WHERE cycle_id = $1 AND to_username = $2 AND NOT is_summary"
        ))
        .bind(cycle_id.as_uuid())
        .bind(to.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list contributions", e))?;

        self.with_answers(rows).await
    }

    async fn list_summary_recipients(&self, cycle_id: &CycleId) -> Result<Vec<Username>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT to_username FROM forms WHERE cycle_id = $1 AND is_summary ORDER BY to_username",
        )
        .bind(cycle_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list summary recipients", e))?;

        rows.into_iter().map(|(name,)| parse_username(name)).collect()
    }

    async fn create(&self, form: &Form) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let existing = Self::lock_summary(&mut tx, form).await?;
        form.validate(&existing)?;

        sqlx::query(
            r#"
            INSERT INTO forms (id, cycle_id, from_username, to_username, is_summary)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(form.id().as_uuid())
        .bind(form.cycle_id().as_uuid())
        .bind(form.from_username().as_str())
        .bind(form.to_username().as_str())
        .bind(form.is_summary())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_form_error(form, "Failed to insert form", e))?;

        for answer in form.answers() {
            sqlx::query(
                "INSERT INTO answers (id, form_id, question_id, content) VALUES ($1, $2, $3, $4)",
            )
            .bind(answer.id.as_uuid())
            .bind(form.id().as_uuid())
            .bind(answer.question_id.as_uuid())
            .bind(&answer.content)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_form_error(form, "Failed to insert answer", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(())
    }

    async fn update_answers(&self, form: &Form) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let existing = Self::lock_summary(&mut tx, form).await?;

        let touched = sqlx::query("UPDATE forms SET updated_at = now() WHERE id = $1")
            .bind(form.id().as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to update form", e))?;
        if touched.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::FormNotFound,
                format!("Form not found: {}", form.id()),
            ));
        }
        form.validate(&existing)?;

        for answer in form.answers() {
            sqlx::query("UPDATE answers SET content = $3 WHERE id = $1 AND form_id = $2")
                .bind(answer.id.as_uuid())
                .bind(form.id().as_uuid())
                .bind(&answer.content)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_form_error(form, "Failed to update answer", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(())
    }
}
