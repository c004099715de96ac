//! Order repository.
//!
//! Placing an order decrements stock with a conditional `UPDATE` and inserts
//! the order in the same transaction, so two buyers can never be sold the
//! same unit. Cancelling a pending order puts the units back.

use sqlx::PgPool;
use thiserror::Error;

use pawgo_core::inventory::{self, StockError};
use pawgo_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::Order;

macro_rules! order_columns {
    () => {
        "id, buyer_id, product_id, quantity, unit_price, total, shipping_address, status, \
         created_at, updated_at"
    };
}

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Stock(#[from] StockError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::from(e))
    }
}

pub struct NewOrder<'a> {
    pub product_id: ProductId,
    pub quantity: i32,
    pub shipping_address: &'a str,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(concat!(
            "SELECT ",
            order_columns!(),
            " FROM pawgo.customer_order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Orders placed by `buyer`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_buyer(&self, buyer: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(concat!(
            "SELECT ",
            order_columns!(),
            " FROM pawgo.customer_order WHERE buyer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(buyer)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(concat!(
            "SELECT ",
            order_columns!(),
            " FROM pawgo.customer_order ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Reserve stock and place an order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Stock` if the quantity is invalid or exceeds stock;
    /// nothing is written in that case.
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn create(&self, buyer: UserId, new: &NewOrder<'_>) -> Result<Order, OrderError> {
        let requested = u32::try_from(new.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(StockError::InvalidQuantity)?;

        let mut tx = self.pool.begin().await?;

        let reserved: Option<(Price,)> = sqlx::query_as(
            "UPDATE pawgo.product SET quantity = quantity - $2, updated_at = now() \
             WHERE id = $1 AND quantity >= $2 RETURNING price",
        )
        .bind(new.product_id)
        .bind(new.quantity)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((unit_price,)) = reserved else {
            let available: i32 =
                sqlx::query_scalar("SELECT quantity FROM pawgo.product WHERE id = $1")
                    .bind(new.product_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or(RepositoryError::NotFound)?;

            inventory::reserve(available, new.quantity)?;
            // Stock was topped up between the two statements.
            return Err(RepositoryError::Conflict("stock changed, please retry".to_owned()).into());
        };

        let order = sqlx::query_as::<_, Order>(concat!(
            "INSERT INTO pawgo.customer_order ",
            "(buyer_id, product_id, quantity, unit_price, total, shipping_address) ",
            "VALUES ($1, $2, $3, $4, $5, $6) RETURNING ",
            order_columns!()
        ))
        .bind(buyer)
        .bind(new.product_id)
        .bind(new.quantity)
        .bind(unit_price)
        .bind(unit_price.times(requested))
        .bind(new.shipping_address)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(order)
    }

    /// Move an order from `current` to `next`, restocking on cancellation of
    /// a pending order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the status changed concurrently.
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        current: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(concat!(
            "UPDATE pawgo.customer_order SET status = $3, updated_at = now() ",
            "WHERE id = $1 AND status = $2 RETURNING ",
            order_columns!()
        ))
        .bind(id)
        .bind(current)
        .bind(next)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::Conflict("order status changed".to_owned()))?;

        if current.restocks(next) {
            sqlx::query(
                "UPDATE pawgo.product SET quantity = quantity + $2, updated_at = now() WHERE id = $1",
            )
            .bind(order.product_id)
            .bind(order.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order)
    }
}
