//! Advertisement repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pawgo_core::{AdvertisementId, UserId};

use super::RepositoryError;
use crate::models::Advertisement;

macro_rules! advertisement_columns {
    () => {
        "id, owner_id, title, description, image_url, link_url, starts_at, ends_at, \
         created_at, updated_at"
    };
}

/// Advertisement fields as written on create and update.
pub struct AdvertisementFields<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image_url: &'a str,
    pub link_url: Option<&'a str>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Repository for advertisement database operations.
pub struct AdvertisementRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdvertisementRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AdvertisementId) -> Result<Option<Advertisement>, RepositoryError> {
        let ad = sqlx::query_as::<_, Advertisement>(concat!(
            "SELECT ",
            advertisement_columns!(),
            " FROM pawgo.advertisement WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(ad)
    }

    /// Ads whose window contains `now`, ending soonest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Advertisement>, RepositoryError> {
        let ads = sqlx::query_as::<_, Advertisement>(concat!(
            "SELECT ",
            advertisement_columns!(),
            " FROM pawgo.advertisement WHERE starts_at <= $1 AND ends_at > $1 ORDER BY ends_at"
        ))
        .bind(now)
        .fetch_all(self.pool)
        .await?;

        Ok(ads)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Advertisement>, RepositoryError> {
        let ads = sqlx::query_as::<_, Advertisement>(concat!(
            "SELECT ",
            advertisement_columns!(),
            " FROM pawgo.advertisement WHERE owner_id = $1 ORDER BY starts_at DESC"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(ads)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        owner: UserId,
        fields: &AdvertisementFields<'_>,
    ) -> Result<Advertisement, RepositoryError> {
        let ad = sqlx::query_as::<_, Advertisement>(concat!(
            "INSERT INTO pawgo.advertisement ",
            "(owner_id, title, description, image_url, link_url, starts_at, ends_at) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
            advertisement_columns!()
        ))
        .bind(owner)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.image_url)
        .bind(fields.link_url)
        .bind(fields.starts_at)
        .bind(fields.ends_at)
        .fetch_one(self.pool)
        .await?;

        Ok(ad)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the advertisement doesn't exist.
    pub async fn update(
        &self,
        id: AdvertisementId,
        fields: &AdvertisementFields<'_>,
    ) -> Result<Advertisement, RepositoryError> {
        sqlx::query_as::<_, Advertisement>(concat!(
            "UPDATE pawgo.advertisement SET title = $2, description = $3, image_url = $4, ",
            "link_url = $5, starts_at = $6, ends_at = $7, updated_at = now() ",
            "WHERE id = $1 RETURNING ",
            advertisement_columns!()
        ))
        .bind(id)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.image_url)
        .bind(fields.link_url)
        .bind(fields.starts_at)
        .bind(fields.ends_at)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the advertisement doesn't exist.
    pub async fn delete(&self, id: AdvertisementId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pawgo.advertisement WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
