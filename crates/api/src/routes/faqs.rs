//! FAQ routes. Reads are public, writes need an admin token.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use pawgo_core::FaqId;

use super::{JsonBody, PathParam, required};
use crate::db::FaqRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Faq;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct FaqRequest {
    pub question: String,
    pub answer: String,
}

/// GET /api/faqs
///
/// # Errors
///
/// 500 on database failure.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Faq>>> {
    Ok(Json(FaqRepository::new(state.pool()).list().await?))
}

/// GET /api/faqs/{id}
///
/// # Errors
///
/// 404 if unknown.
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<FaqId>,
) -> Result<Json<Faq>> {
    FaqRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("faq"))
}

/// POST /api/faqs
///
/// # Errors
///
/// 403 for non-admins, 409 for a duplicate question.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    JsonBody(req): JsonBody<FaqRequest>,
) -> Result<impl IntoResponse> {
    let faq = FaqRepository::new(state.pool())
        .create(
            required("question", &req.question)?,
            required("answer", &req.answer)?,
            Some(admin.id),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(faq)))
}

/// PUT /api/faqs/{id}
///
/// # Errors
///
/// 403 for non-admins, 404 if unknown.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    PathParam(id): PathParam<FaqId>,
    JsonBody(req): JsonBody<FaqRequest>,
) -> Result<Json<Faq>> {
    let faq = FaqRepository::new(state.pool())
        .update(
            id,
            required("question", &req.question)?,
            required("answer", &req.answer)?,
        )
        .await?;

    Ok(Json(faq))
}

/// DELETE /api/faqs/{id}
///
/// # Errors
///
/// 403 for non-admins, 404 if unknown.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    PathParam(id): PathParam<FaqId>,
) -> Result<StatusCode> {
    FaqRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
