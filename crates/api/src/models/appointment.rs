//! Appointments and their booked time slots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use pawgo_core::{
    AppointmentId, AppointmentStatus, PackageTier, PetId, Price, ScheduleId, ScheduleKind,
    ServiceId, UserId,
};

/// A booking of one pet onto one service tier.
///
/// `provider_id` is not a column of the appointment table; it is joined in
/// from the service so access checks can see both parties.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: AppointmentId,
    pub owner_id: UserId,
    pub pet_id: PetId,
    pub service_id: ServiceId,
    pub provider_id: UserId,
    pub package_tier: PackageTier,
    pub start_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    /// Tier price before any loyalty discount.
    pub price: Price,
    pub discount_percent: i16,
    /// Amount due.
    pub total: Price,
    pub notes: Option<String>,
    pub contact_phone: Option<String>,
    pub pet_type: Option<String>,
    pub pet_weight_kg: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether `user` is a party to this appointment.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.owner_id == user || self.provider_id == user
    }
}

/// Time slot derived for an appointment.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Schedule {
    pub id: ScheduleId,
    pub appointment_id: AppointmentId,
    pub kind: ScheduleKind,
    /// Duration label as submitted, e.g. `overnight` or `custom`.
    pub duration: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
