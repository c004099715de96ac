//! Marketplace product model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pawgo_core::{Price, ProductId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: UserId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    /// Units in stock.
    pub quantity: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
