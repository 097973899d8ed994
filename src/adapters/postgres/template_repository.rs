//! PostgreSQL implementation of TemplateRepository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::cycle::{Question, QuestionTemplate};
use crate::domain::foundation::{DomainError, ErrorCode, QuestionId, TemplateId};
use crate::ports::TemplateRepository;

use super::db_error;

/// PostgreSQL implementation of the TemplateRepository port.
pub struct PostgresTemplateRepository {
    pool: PgPool,
}

impl PostgresTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct QuestionRow {
    id: Uuid,
    caption: String,
    prompt: String,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question {
            id: QuestionId::from_uuid(row.id),
            caption: row.caption,
            prompt: row.prompt,
        }
    }
}

#[async_trait]
impl TemplateRepository for PostgresTemplateRepository {
    async fn save(&self, template: &QuestionTemplate) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query("INSERT INTO question_templates (id) VALUES ($1)")
            .bind(template.id().as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert template", e))?;

        for (position, question) in template.questions().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO questions (id, caption, prompt) VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE SET caption = EXCLUDED.caption, prompt = EXCLUDED.prompt
                "#,
            )
            .bind(question.id.as_uuid())
            .bind(&question.caption)
            .bind(&question.prompt)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert question", e))?;

            sqlx::query(
                "INSERT INTO template_rows (template_id, question_id, position) VALUES ($1, $2, $3)",
            )
            .bind(template.id().as_uuid())
            .bind(question.id.as_uuid())
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert template row", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &TemplateId) -> Result<Option<QuestionTemplate>, DomainError> {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM question_templates WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find template", e))?;
        if exists.is_none() {
            return Ok(None);
        }

        let rows: Vec<QuestionRow> = sqlx::query_as(
            r#"
            SELECT q.id, q.caption, q.prompt
            FROM template_rows t
            JOIN questions q ON q.id = t.question_id
            WHERE t.template_id = $1
            ORDER BY t.position ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load template questions", e))?;

        let questions = rows.into_iter().map(Question::from).collect();
        QuestionTemplate::new(*id, questions).map(Some).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid template {} stored: {}", id, e),
            )
        })
    }
}
