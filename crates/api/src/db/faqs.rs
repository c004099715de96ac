//! FAQ repository.

use sqlx::PgPool;

use pawgo_core::{FaqId, UserId};

use super::RepositoryError;
use crate::models::Faq;

macro_rules! faq_columns {
    () => {
        "id, question, answer, created_by, created_at, updated_at"
    };
}

/// Repository for FAQ database operations.
pub struct FaqRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FaqRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: FaqId) -> Result<Option<Faq>, RepositoryError> {
        let faq = sqlx::query_as::<_, Faq>(concat!(
            "SELECT ",
            faq_columns!(),
            " FROM pawgo.faq WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(faq)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Faq>, RepositoryError> {
        let faqs = sqlx::query_as::<_, Faq>(concat!(
            "SELECT ",
            faq_columns!(),
            " FROM pawgo.faq ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(faqs)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the question already exists.
    pub async fn create(
        &self,
        question: &str,
        answer: &str,
        created_by: Option<UserId>,
    ) -> Result<Faq, RepositoryError> {
        sqlx::query_as::<_, Faq>(concat!(
            "INSERT INTO pawgo.faq (question, answer, created_by) VALUES ($1, $2, $3) RETURNING ",
            faq_columns!()
        ))
        .bind(question)
        .bind(answer)
        .bind(created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_write(e, "question already exists"))
    }

    /// Insert unless the question is already present.
    ///
    /// Returns `None` when the question was skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_if_absent(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<Option<Faq>, RepositoryError> {
        let faq = sqlx::query_as::<_, Faq>(concat!(
            "INSERT INTO pawgo.faq (question, answer) VALUES ($1, $2) ",
            "ON CONFLICT (question) DO NOTHING RETURNING ",
            faq_columns!()
        ))
        .bind(question)
        .bind(answer)
        .fetch_optional(self.pool)
        .await?;

        Ok(faq)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the FAQ doesn't exist.
    /// Returns `RepositoryError::Conflict` if another FAQ has the question.
    pub async fn update(&self, id: FaqId, question: &str, answer: &str) -> Result<Faq, RepositoryError> {
        sqlx::query_as::<_, Faq>(concat!(
            "UPDATE pawgo.faq SET question = $2, answer = $3, updated_at = now() ",
            "WHERE id = $1 RETURNING ",
            faq_columns!()
        ))
        .bind(id)
        .bind(question)
        .bind(answer)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::on_write(e, "question already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the FAQ doesn't exist.
    pub async fn delete(&self, id: FaqId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pawgo.faq WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
