//! Marketplace product routes.
//!
//! ```text
//! GET    /api/products          - Public, optional ?category=
//! GET    /api/products/{id}     - Public
//! POST   /api/products          - Provider or admin
//! PUT    /api/products/{id}     - Seller or admin
//! DELETE /api/products/{id}     - Seller or admin
//! ```

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use pawgo_core::{Price, ProductId};

use super::{JsonBody, PathParam, QueryParams, optional, required};
use crate::db::ProductRepository;
use crate::db::products::ProductFields;
use crate::error::{AppError, Result};
use crate::middleware::RequireProvider;
use crate::models::{CurrentUser, Product};
use crate::services::access::ensure_owner;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Price,
    pub quantity: i32,
    pub image_url: Option<String>,
}

impl ProductRequest {
    fn fields(&self) -> Result<ProductFields<'_>> {
        let price = Price::positive(self.price.amount())?;
        if self.quantity < 0 {
            return Err(AppError::BadRequest("quantity cannot be negative".to_owned()));
        }

        Ok(ProductFields {
            name: required("name", &self.name)?,
            description: self.description.trim(),
            category: required("category", &self.category)?,
            price,
            quantity: self.quantity,
            image_url: optional(self.image_url.as_deref()),
        })
    }
}

async fn owned_product(state: &AppState, user: &CurrentUser, id: ProductId) -> Result<Product> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("product"))?;
    ensure_owner(user, product.seller_id, "product")?;
    Ok(product)
}

/// GET /api/products
///
/// # Errors
///
/// 500 on database failure.
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let category = optional(query.category.as_deref());
    Ok(Json(ProductRepository::new(state.pool()).list(category).await?))
}

/// GET /api/products/{id}
///
/// # Errors
///
/// 404 if unknown.
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("product"))
}

/// POST /api/products
///
/// # Errors
///
/// 403 for pet owners, 400 for invalid fields.
pub async fn create(
    State(state): State<AppState>,
    RequireProvider(user): RequireProvider,
    JsonBody(req): JsonBody<ProductRequest>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .create(user.id, &req.fields()?)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}
///
/// # Errors
///
/// 403 unless the caller sells the product or is an admin.
pub async fn update(
    State(state): State<AppState>,
    RequireProvider(user): RequireProvider,
    PathParam(id): PathParam<ProductId>,
    JsonBody(req): JsonBody<ProductRequest>,
) -> Result<Json<Product>> {
    owned_product(&state, &user, id).await?;
    let product = ProductRepository::new(state.pool())
        .update(id, &req.fields()?)
        .await?;

    Ok(Json(product))
}

/// DELETE /api/products/{id}
///
/// # Errors
///
/// 403 unless the caller sells the product or is an admin, 409 once ordered.
pub async fn remove(
    State(state): State<AppState>,
    RequireProvider(user): RequireProvider,
    PathParam(id): PathParam<ProductId>,
) -> Result<StatusCode> {
    owned_product(&state, &user, id).await?;
    ProductRepository::new(state.pool()).delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
