//! Product repository.
//!
//! Stock changes made by orders live in [`super::orders`].

use sqlx::PgPool;

use pawgo_core::{Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::Product;

macro_rules! product_columns {
    () => {
        "id, seller_id, name, description, category, price, quantity, image_url, created_at, updated_at"
    };
}

pub struct ProductFields<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub price: Price,
    pub quantity: i32,
    pub image_url: Option<&'a str>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM pawgo.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// List products, optionally within one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM pawgo.product WHERE ($1::text IS NULL OR category = $1) ORDER BY id"
        ))
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        seller: UserId,
        fields: &ProductFields<'_>,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "INSERT INTO pawgo.product (seller_id, name, description, category, price, quantity, image_url) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
            product_columns!()
        ))
        .bind(seller)
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.category)
        .bind(fields.price)
        .bind(fields.quantity)
        .bind(fields.image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Replace a product's fields, including its stock level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        fields: &ProductFields<'_>,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(concat!(
            "UPDATE pawgo.product SET name = $2, description = $3, category = $4, price = $5, ",
            "quantity = $6, image_url = $7, updated_at = now() WHERE id = $1 RETURNING ",
            product_columns!()
        ))
        .bind(id)
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.category)
        .bind(fields.price)
        .bind(fields.quantity)
        .bind(fields.image_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if orders reference it.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pawgo.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::on_write(e, "product has orders"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
