//! Payment model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pawgo_core::{AppointmentId, PaymentId, PaymentStatus, Price, UserId};

/// A payment against an appointment.
///
/// Only the brand, last four digits and a keyed fingerprint of the card are
/// kept. The fingerprint is used for matching and is not serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Payment {
    pub id: PaymentId,
    pub appointment_id: AppointmentId,
    pub payer_id: UserId,
    pub amount: Price,
    pub status: PaymentStatus,
    pub card_brand: String,
    pub card_last4: String,
    #[serde(skip)]
    pub card_fingerprint: String,
    pub holder_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
