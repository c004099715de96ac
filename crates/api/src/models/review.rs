//! Service review model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pawgo_core::{ReviewId, ServiceId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub author_id: UserId,
    pub service_id: ServiceId,
    /// Star rating, 1 to 5.
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
