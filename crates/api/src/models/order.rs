//! Marketplace order model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pawgo_core::{OrderId, OrderStatus, Price, ProductId, UserId};

/// An order for some units of one product.
///
/// `unit_price` is the product price at the time of ordering.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Price,
    pub total: Price,
    pub shipping_address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
