//! Review routes.
//!
//! ```text
//! GET    /api/reviews          - Public, optional ?service_id=
//! GET    /api/reviews/{id}     - Public
//! POST   /api/reviews          - Any signed-in user, once per service
//! PUT    /api/reviews/{id}     - Author
//! DELETE /api/reviews/{id}     - Author or admin
//! ```

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use pawgo_core::{Rating, ReviewId, ServiceId};

use super::{JsonBody, PathParam, QueryParams};
use crate::db::{ReviewRepository, ServiceRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Review;
use crate::services::access::{ensure_is, ensure_owner};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub service_id: Option<ServiceId>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub service_id: ServiceId,
    pub rating: Rating,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewUpdate {
    pub rating: Rating,
    #[serde(default)]
    pub comment: String,
}

async fn load(state: &AppState, id: ReviewId) -> Result<Review> {
    ReviewRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("review"))
}

/// GET /api/reviews
///
/// # Errors
///
/// 500 on database failure.
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Vec<Review>>> {
    Ok(Json(ReviewRepository::new(state.pool()).list(query.service_id).await?))
}

/// GET /api/reviews/{id}
///
/// # Errors
///
/// 404 if unknown.
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<ReviewId>,
) -> Result<Json<Review>> {
    Ok(Json(load(&state, id).await?))
}

/// POST /api/reviews
///
/// # Errors
///
/// 400 for a rating outside 1-5, 404 for an unknown service, 409 for a
/// second review of the same service.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(req): JsonBody<ReviewRequest>,
) -> Result<impl IntoResponse> {
    ServiceRepository::new(state.pool())
        .get(req.service_id)
        .await?
        .ok_or_else(|| AppError::not_found("service"))?;

    let review = ReviewRepository::new(state.pool())
        .create(user.id, req.service_id, req.rating, req.comment.trim())
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// PUT /api/reviews/{id}
///
/// Only the author may edit, admins included.
///
/// # Errors
///
/// 403 for anyone but the author.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<ReviewId>,
    JsonBody(req): JsonBody<ReviewUpdate>,
) -> Result<Json<Review>> {
    let review = load(&state, id).await?;
    ensure_is(&user, review.author_id, "review")?;

    let updated = ReviewRepository::new(state.pool())
        .update(id, req.rating, req.comment.trim())
        .await?;

    Ok(Json(updated))
}

/// DELETE /api/reviews/{id}
///
/// # Errors
///
/// 403 unless the caller wrote the review or is an admin.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<ReviewId>,
) -> Result<StatusCode> {
    let review = load(&state, id).await?;
    ensure_owner(&user, review.author_id, "review")?;
    ReviewRepository::new(state.pool()).delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
