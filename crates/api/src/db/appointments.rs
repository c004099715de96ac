//! Appointment and schedule repository.
//!
//! Every appointment read joins `service` so the provider is known alongside
//! the pet owner. Loyalty balance changes ride in the same transaction as the
//! appointment write that causes them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use pawgo_core::loyalty::{self, Redemption};
use pawgo_core::{
    AppointmentId, AppointmentStatus, PackageTier, PetId, Price, ScheduleKind, ServiceId, UserId,
};

use super::RepositoryError;
use crate::models::{Appointment, Schedule};

macro_rules! appointment_columns {
    () => {
        "a.id, a.owner_id, a.pet_id, a.service_id, s.provider_id, a.package_tier, a.start_time, \
         a.status, a.price, a.discount_percent, a.total, a.notes, a.contact_phone, a.pet_type, \
         a.pet_weight_kg, a.created_at, a.updated_at"
    };
}

macro_rules! schedule_columns {
    () => {
        "id, appointment_id, kind, duration, start_time, end_time, created_at"
    };
}

/// A booking request, already checked against pet ownership.
pub struct NewAppointment<'a> {
    pub pet_id: PetId,
    pub service_id: ServiceId,
    pub package_tier: PackageTier,
    pub start_time: DateTime<Utc>,
    pub notes: Option<&'a str>,
    pub contact_phone: Option<&'a str>,
    pub pet_type: Option<&'a str>,
    pub pet_weight_kg: Option<Decimal>,
    /// Spend the owner's whole loyalty balance on this booking.
    pub redeem_points: bool,
}

/// Fields the owner may change while an appointment is pending.
pub struct AppointmentUpdate<'a> {
    pub start_time: Option<DateTime<Utc>>,
    pub notes: Option<&'a str>,
    pub contact_phone: Option<&'a str>,
    pub pet_type: Option<&'a str>,
    pub pet_weight_kg: Option<Decimal>,
}

/// A resolved time slot.
pub struct NewSchedule<'a> {
    pub kind: ScheduleKind,
    pub duration: &'a str,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Repository for appointment database operations.
pub struct AppointmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AppointmentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        let appointment = sqlx::query_as::<_, Appointment>(concat!(
            "SELECT ",
            appointment_columns!(),
            " FROM pawgo.appointment a JOIN pawgo.service s ON s.id = a.service_id WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(appointment)
    }

    /// Appointments booked by a pet owner, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Appointment>, RepositoryError> {
        let appointments = sqlx::query_as::<_, Appointment>(concat!(
            "SELECT ",
            appointment_columns!(),
            " FROM pawgo.appointment a JOIN pawgo.service s ON s.id = a.service_id ",
            "WHERE a.owner_id = $1 ORDER BY a.start_time"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(appointments)
    }

    /// Appointments booked onto a provider's services, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_provider(
        &self,
        provider: UserId,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let appointments = sqlx::query_as::<_, Appointment>(concat!(
            "SELECT ",
            appointment_columns!(),
            " FROM pawgo.appointment a JOIN pawgo.service s ON s.id = a.service_id ",
            "WHERE s.provider_id = $1 ORDER BY a.start_time"
        ))
        .bind(provider)
        .fetch_all(self.pool)
        .await?;

        Ok(appointments)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Appointment>, RepositoryError> {
        let appointments = sqlx::query_as::<_, Appointment>(concat!(
            "SELECT ",
            appointment_columns!(),
            " FROM pawgo.appointment a JOIN pawgo.service s ON s.id = a.service_id ",
            "ORDER BY a.start_time"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(appointments)
    }

    /// Book an appointment at the tier's current price.
    ///
    /// With `redeem_points` the owner's row is locked, the balance is turned
    /// into a percentage discount and reset to zero before the insert commits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the service (or owner) doesn't exist.
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(
        &self,
        owner: UserId,
        new: &NewAppointment<'_>,
    ) -> Result<Appointment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let price: Price = sqlx::query_scalar(
            "SELECT price FROM pawgo.service_package WHERE service_id = $1 AND tier = $2",
        )
        .bind(new.service_id)
        .bind(new.package_tier)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let redemption = if new.redeem_points {
            let points: i32 = sqlx::query_scalar(
                "SELECT loyalty_points FROM pawgo.app_user WHERE id = $1 FOR UPDATE",
            )
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

            let redemption = loyalty::redeem(points);
            sqlx::query(
                "UPDATE pawgo.app_user SET loyalty_points = $2, updated_at = now() WHERE id = $1",
            )
            .bind(owner)
            .bind(redemption.remaining_points)
            .execute(&mut *tx)
            .await?;
            redemption
        } else {
            Redemption {
                discount_percent: 0,
                remaining_points: 0,
            }
        };

        let total = price.discounted(redemption.discount_percent);

        let appointment = sqlx::query_as::<_, Appointment>(concat!(
            "WITH a AS (",
            "INSERT INTO pawgo.appointment (owner_id, pet_id, service_id, package_tier, start_time, ",
            "price, discount_percent, total, notes, contact_phone, pet_type, pet_weight_kg) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *) ",
            "SELECT ",
            appointment_columns!(),
            " FROM a JOIN pawgo.service s ON s.id = a.service_id"
        ))
        .bind(owner)
        .bind(new.pet_id)
        .bind(new.service_id)
        .bind(new.package_tier)
        .bind(new.start_time)
        .bind(price)
        .bind(i16::from(redemption.discount_percent))
        .bind(total)
        .bind(new.notes)
        .bind(new.contact_phone)
        .bind(new.pet_type)
        .bind(new.pet_weight_kg)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(appointment)
    }

    /// Reschedule or edit a pending appointment. `None` fields are unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the appointment is no longer pending.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: AppointmentId,
        update: &AppointmentUpdate<'_>,
    ) -> Result<Appointment, RepositoryError> {
        sqlx::query_as::<_, Appointment>(concat!(
            "WITH a AS (",
            "UPDATE pawgo.appointment SET start_time = COALESCE($2, start_time), ",
            "notes = COALESCE($3, notes), contact_phone = COALESCE($4, contact_phone), ",
            "pet_type = COALESCE($5, pet_type), pet_weight_kg = COALESCE($6, pet_weight_kg), ",
            "updated_at = now() WHERE id = $1 AND status = 'pending' RETURNING *) ",
            "SELECT ",
            appointment_columns!(),
            " FROM a JOIN pawgo.service s ON s.id = a.service_id"
        ))
        .bind(id)
        .bind(update.start_time)
        .bind(update.notes)
        .bind(update.contact_phone)
        .bind(update.pet_type)
        .bind(update.pet_weight_kg)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| RepositoryError::Conflict("appointment is no longer pending".to_owned()))
    }

    /// Move an appointment from `current` to `next`.
    ///
    /// The update only applies if the stored status is still `current`. When
    /// the move confirms a booking, the tier's loyalty points are credited to
    /// the pet owner in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the status changed concurrently.
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn set_status(
        &self,
        id: AppointmentId,
        current: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<Appointment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let appointment = sqlx::query_as::<_, Appointment>(concat!(
            "WITH a AS (",
            "UPDATE pawgo.appointment SET status = $3, updated_at = now() ",
            "WHERE id = $1 AND status = $2 RETURNING *) ",
            "SELECT ",
            appointment_columns!(),
            " FROM a JOIN pawgo.service s ON s.id = a.service_id"
        ))
        .bind(id)
        .bind(current)
        .bind(next)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::Conflict("appointment status changed".to_owned()))?;

        if current.awards_loyalty(next) {
            sqlx::query(
                "UPDATE pawgo.app_user SET loyalty_points = loyalty_points + $2, \
                 updated_at = now() WHERE id = $1",
            )
            .bind(appointment.owner_id)
            .bind(appointment.package_tier.loyalty_points())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(appointment)
    }

    /// Delete an appointment and its schedule.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the appointment doesn't exist.
    /// Returns `RepositoryError::Conflict` if a payment references it.
    pub async fn delete(&self, id: AppointmentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pawgo.appointment WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::on_write(e, "appointment has a payment"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Attach a time slot to an appointment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the appointment already has one.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_schedule(
        &self,
        appointment: AppointmentId,
        new: &NewSchedule<'_>,
    ) -> Result<Schedule, RepositoryError> {
        sqlx::query_as::<_, Schedule>(concat!(
            "INSERT INTO pawgo.schedule (appointment_id, kind, duration, start_time, end_time) ",
            "VALUES ($1, $2, $3, $4, $5) RETURNING ",
            schedule_columns!()
        ))
        .bind(appointment)
        .bind(new.kind)
        .bind(new.duration)
        .bind(new.start_time)
        .bind(new.end_time)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_write(e, "appointment is already scheduled"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_schedule(
        &self,
        appointment: AppointmentId,
    ) -> Result<Option<Schedule>, RepositoryError> {
        let schedule = sqlx::query_as::<_, Schedule>(concat!(
            "SELECT ",
            schedule_columns!(),
            " FROM pawgo.schedule WHERE appointment_id = $1"
        ))
        .bind(appointment)
        .fetch_optional(self.pool)
        .await?;

        Ok(schedule)
    }
}
