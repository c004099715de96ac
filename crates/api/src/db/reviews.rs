//! Review repository.

use sqlx::PgPool;

use pawgo_core::{Rating, ReviewId, ServiceId, UserId};

use super::RepositoryError;
use crate::models::Review;

macro_rules! review_columns {
    () => {
        "id, author_id, service_id, rating, comment, created_at, updated_at"
    };
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(concat!(
            "SELECT ",
            review_columns!(),
            " FROM pawgo.review WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(review)
    }

    /// Reviews, newest first, optionally for a single service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, service: Option<ServiceId>) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(concat!(
            "SELECT ",
            review_columns!(),
            " FROM pawgo.review WHERE ($1::int4 IS NULL OR service_id = $1) ",
            "ORDER BY created_at DESC"
        ))
        .bind(service)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the author already reviewed the
    /// service, or the service doesn't exist.
    pub async fn create(
        &self,
        author: UserId,
        service: ServiceId,
        rating: Rating,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(concat!(
            "INSERT INTO pawgo.review (author_id, service_id, rating, comment) ",
            "VALUES ($1, $2, $3, $4) RETURNING ",
            review_columns!()
        ))
        .bind(author)
        .bind(service)
        .bind(i16::from(rating))
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_write(e, "service already reviewed or unknown"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn update(
        &self,
        id: ReviewId,
        rating: Rating,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(concat!(
            "UPDATE pawgo.review SET rating = $2, comment = $3, updated_at = now() ",
            "WHERE id = $1 RETURNING ",
            review_columns!()
        ))
        .bind(id)
        .bind(i16::from(rating))
        .bind(comment)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pawgo.review WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
