//! Marketplace order routes.
//!
//! ```text
//! POST   /api/orders               - Place an order (stock reserved atomically)
//! GET    /api/orders               - Own orders (admin: all)
//! GET    /api/orders/{id}          - Buyer or admin
//! PATCH  /api/orders/{id}/status   - Product seller or admin
//! DELETE /api/orders/{id}          - Cancel: buyer while pending, or admin
//! ```

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use serde::Deserialize;

use pawgo_core::{OrderId, OrderStatus, ProductId};

use super::{JsonBody, PathParam, required};
use crate::db::orders::NewOrder;
use crate::db::{OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Order};
use crate::services::access::{ensure_any_of, ensure_owner};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).delete(cancel))
        .route("/{id}/status", patch(set_status))
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub product_id: ProductId,
    pub quantity: i32,
    pub shipping_address: String,
}

async fn load(state: &AppState, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("order"))
}

fn ensure_transition(current: OrderStatus, next: OrderStatus) -> Result<()> {
    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "cannot move order from {current} to {next}"
        )));
    }
    Ok(())
}

/// POST /api/orders
///
/// # Errors
///
/// 404 for an unknown product, 400 when the quantity is not positive or
/// exceeds stock (stock is left untouched).
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(req): JsonBody<OrderRequest>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.pool())
        .create(
            user.id,
            &NewOrder {
                product_id: req.product_id,
                quantity: req.quantity,
                shipping_address: required("shipping_address", &req.shipping_address)?,
            },
        )
        .await?;

    tracing::info!(
        order_id = %order.id,
        product_id = %order.product_id,
        quantity = order.quantity,
        "Order placed"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
///
/// # Errors
///
/// 401 without a token.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.pool());
    let orders = if user.is_admin() {
        repo.list_all().await?
    } else {
        repo.list_for_buyer(user.id).await?
    };
    Ok(Json(orders))
}

/// GET /api/orders/{id}
///
/// # Errors
///
/// 403 unless the caller placed the order or is an admin.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<OrderId>,
) -> Result<Json<Order>> {
    let order = load(&state, id).await?;
    ensure_owner(&user, order.buyer_id, "order")?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

async fn ensure_seller(state: &AppState, user: &CurrentUser, order: &Order) -> Result<()> {
    if user.is_admin() {
        return Ok(());
    }
    let product = ProductRepository::new(state.pool())
        .get(order.product_id)
        .await?
        .ok_or_else(|| AppError::not_found("product"))?;
    ensure_any_of(user, &[product.seller_id], "order")?;
    Ok(())
}

/// PATCH /api/orders/{id}/status
///
/// Cancelling a pending order returns its units to stock.
///
/// # Errors
///
/// 403 unless the caller sells the product or is an admin, 400 for a
/// transition outside pending→shipped→delivered / pending→cancelled.
pub async fn set_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<OrderId>,
    JsonBody(req): JsonBody<StatusRequest>,
) -> Result<Json<Order>> {
    let order = load(&state, id).await?;
    ensure_seller(&state, &user, &order).await?;
    ensure_transition(order.status, req.status)?;

    let updated = OrderRepository::new(state.pool())
        .set_status(id, order.status, req.status)
        .await?;

    tracing::info!(order_id = %id, from = %order.status, to = %updated.status, "Order status changed");

    Ok(Json(updated))
}

/// DELETE /api/orders/{id}
///
/// Cancels the order and restocks the product. The order row is kept with
/// status `cancelled`.
///
/// # Errors
///
/// 403 unless the caller placed the order or is an admin, 400 once the order
/// has left `pending`.
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<OrderId>,
) -> Result<Json<Order>> {
    let order = load(&state, id).await?;
    ensure_owner(&user, order.buyer_id, "order")?;
    ensure_transition(order.status, OrderStatus::Cancelled)?;

    let cancelled = OrderRepository::new(state.pool())
        .set_status(id, order.status, OrderStatus::Cancelled)
        .await?;

    tracing::info!(order_id = %id, restocked = cancelled.quantity, "Order cancelled");

    Ok(Json(cancelled))
}
