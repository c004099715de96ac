//! Account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pawgo_core::{Email, UserId, UserRole};

/// A Pawgo account.
///
/// The password hash is deliberately not part of this type, so it can never be
/// serialized into a response.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Unredeemed loyalty balance.
    pub loyalty_points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
