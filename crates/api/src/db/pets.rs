//! Pet repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use pawgo_core::{PetId, UserId};

use super::RepositoryError;
use crate::models::Pet;

macro_rules! pet_columns {
    () => {
        "id, owner_id, name, species, breed, age_years, weight_kg, image_url, created_at, updated_at"
    };
}

/// Pet fields as written on create and update.
pub struct PetFields<'a> {
    pub name: &'a str,
    pub species: &'a str,
    pub breed: Option<&'a str>,
    pub age_years: Option<i32>,
    pub weight_kg: Option<Decimal>,
    pub image_url: Option<&'a str>,
}

/// Repository for pet database operations.
pub struct PetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PetRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        let pet = sqlx::query_as::<_, Pet>(concat!(
            "SELECT ",
            pet_columns!(),
            " FROM pawgo.pet WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(pet)
    }

    /// Pets owned by `owner`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Pet>, RepositoryError> {
        let pets = sqlx::query_as::<_, Pet>(concat!(
            "SELECT ",
            pet_columns!(),
            " FROM pawgo.pet WHERE owner_id = $1 ORDER BY id"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(pets)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, owner: UserId, fields: &PetFields<'_>) -> Result<Pet, RepositoryError> {
        let pet = sqlx::query_as::<_, Pet>(concat!(
            "INSERT INTO pawgo.pet (owner_id, name, species, breed, age_years, weight_kg, image_url) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
            pet_columns!()
        ))
        .bind(owner)
        .bind(fields.name)
        .bind(fields.species)
        .bind(fields.breed)
        .bind(fields.age_years)
        .bind(fields.weight_kg)
        .bind(fields.image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(pet)
    }

    /// Replace a pet's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the pet doesn't exist.
    pub async fn update(&self, id: PetId, fields: &PetFields<'_>) -> Result<Pet, RepositoryError> {
        sqlx::query_as::<_, Pet>(concat!(
            "UPDATE pawgo.pet SET name = $2, species = $3, breed = $4, age_years = $5, ",
            "weight_kg = $6, image_url = $7, updated_at = now() WHERE id = $1 RETURNING ",
            pet_columns!()
        ))
        .bind(id)
        .bind(fields.name)
        .bind(fields.species)
        .bind(fields.breed)
        .bind(fields.age_years)
        .bind(fields.weight_kg)
        .bind(fields.image_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the pet doesn't exist.
    /// Returns `RepositoryError::Conflict` if the pet has appointments.
    pub async fn delete(&self, id: PetId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pawgo.pet WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::on_write(e, "pet has appointments"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
