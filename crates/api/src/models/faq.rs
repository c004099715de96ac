//! FAQ model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pawgo_core::{FaqId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Faq {
    pub id: FaqId,
    pub question: String,
    pub answer: String,
    /// Admin who wrote the entry; `None` for seeded entries.
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
