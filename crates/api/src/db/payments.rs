//! Payment repository.

use sqlx::PgPool;

use pawgo_core::{AppointmentId, PaymentId, PaymentStatus, Price, UserId};

use super::RepositoryError;
use crate::models::Payment;

macro_rules! payment_columns {
    () => {
        "id, appointment_id, payer_id, amount, status, card_brand, card_last4, \
         card_fingerprint, holder_name, created_at, updated_at"
    };
}

/// A settled charge, reduced to what may be stored about the card.
pub struct NewPayment<'a> {
    pub appointment_id: AppointmentId,
    pub amount: Price,
    pub status: PaymentStatus,
    pub card_brand: &'a str,
    pub card_last4: &'a str,
    pub card_fingerprint: &'a str,
    pub holder_name: &'a str,
}

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepositoryError> {
        let payment = sqlx::query_as::<_, Payment>(concat!(
            "SELECT ",
            payment_columns!(),
            " FROM pawgo.payment WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(payment)
    }

    /// Payments made by `payer`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_payer(&self, payer: UserId) -> Result<Vec<Payment>, RepositoryError> {
        let payments = sqlx::query_as::<_, Payment>(concat!(
            "SELECT ",
            payment_columns!(),
            " FROM pawgo.payment WHERE payer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(payer)
        .fetch_all(self.pool)
        .await?;

        Ok(payments)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Payment>, RepositoryError> {
        let payments = sqlx::query_as::<_, Payment>(concat!(
            "SELECT ",
            payment_columns!(),
            " FROM pawgo.payment ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(payments)
    }

    /// Record a payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the appointment is already paid for.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, payer: UserId, new: &NewPayment<'_>) -> Result<Payment, RepositoryError> {
        sqlx::query_as::<_, Payment>(concat!(
            "INSERT INTO pawgo.payment (appointment_id, payer_id, amount, status, card_brand, ",
            "card_last4, card_fingerprint, holder_name) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
            payment_columns!()
        ))
        .bind(new.appointment_id)
        .bind(payer)
        .bind(new.amount)
        .bind(new.status)
        .bind(new.card_brand)
        .bind(new.card_last4)
        .bind(new.card_fingerprint)
        .bind(new.holder_name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_write(e, "appointment already has a payment"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment doesn't exist.
    pub async fn set_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
    ) -> Result<Payment, RepositoryError> {
        sqlx::query_as::<_, Payment>(concat!(
            "UPDATE pawgo.payment SET status = $2, updated_at = now() WHERE id = $1 RETURNING ",
            payment_columns!()
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment doesn't exist.
    pub async fn delete(&self, id: PaymentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pawgo.payment WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
