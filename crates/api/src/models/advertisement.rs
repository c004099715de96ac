//! Advertisement model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pawgo_core::{AdvertisementId, UserId};

/// A banner shown between `starts_at` and `ends_at`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Advertisement {
    pub id: AdvertisementId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Advertisement {
    /// Whether the ad is running at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now < self.ends_at
    }
}
