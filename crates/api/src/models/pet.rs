//! Pet model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use pawgo_core::{PetId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Pet {
    pub id: PetId,
    pub owner_id: UserId,
    pub name: String,
    /// Free-form species, e.g. "dog", "cat", "rabbit".
    pub species: String,
    pub breed: Option<String>,
    pub age_years: Option<i32>,
    pub weight_kg: Option<Decimal>,
    /// Object storage URL.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
