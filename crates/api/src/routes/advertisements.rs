//! Advertisement routes.
//!
//! ```text
//! GET    /api/advertisements          - Public, ads running right now
//! GET    /api/advertisements/mine     - Current provider's ads, any window
//! GET    /api/advertisements/{id}     - Public
//! POST   /api/advertisements          - Provider or admin
//! PUT    /api/advertisements/{id}     - Owner or admin
//! DELETE /api/advertisements/{id}     - Owner or admin
//! ```

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use pawgo_core::AdvertisementId;

use super::{JsonBody, PathParam, optional, required};
use crate::db::AdvertisementRepository;
use crate::db::advertisements::AdvertisementFields;
use crate::error::{AppError, Result};
use crate::middleware::RequireProvider;
use crate::models::{Advertisement, CurrentUser};
use crate::services::access::ensure_owner;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_active).post(create))
        .route("/mine", get(mine))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct AdvertisementRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl AdvertisementRequest {
    fn fields(&self) -> Result<AdvertisementFields<'_>> {
        if self.ends_at <= self.starts_at {
            return Err(AppError::BadRequest("ends_at must be after starts_at".to_owned()));
        }

        Ok(AdvertisementFields {
            title: required("title", &self.title)?,
            description: self.description.trim(),
            image_url: required("image_url", &self.image_url)?,
            link_url: optional(self.link_url.as_deref()),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        })
    }
}

async fn owned_ad(
    state: &AppState,
    user: &CurrentUser,
    id: AdvertisementId,
) -> Result<Advertisement> {
    let ad = AdvertisementRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("advertisement"))?;
    ensure_owner(user, ad.owner_id, "advertisement")?;
    Ok(ad)
}

/// GET /api/advertisements
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<Advertisement>>> {
    Ok(Json(
        AdvertisementRepository::new(state.pool())
            .list_active(Utc::now())
            .await?,
    ))
}

/// GET /api/advertisements/mine
///
/// # Errors
///
/// 403 for pet owners.
pub async fn mine(
    State(state): State<AppState>,
    RequireProvider(user): RequireProvider,
) -> Result<Json<Vec<Advertisement>>> {
    Ok(Json(
        AdvertisementRepository::new(state.pool())
            .list_for_owner(user.id)
            .await?,
    ))
}

/// GET /api/advertisements/{id}
///
/// # Errors
///
/// 404 if unknown.
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<AdvertisementId>,
) -> Result<Json<Advertisement>> {
    AdvertisementRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("advertisement"))
}

/// POST /api/advertisements
///
/// # Errors
///
/// 403 for pet owners, 400 for an empty or inverted window.
pub async fn create(
    State(state): State<AppState>,
    RequireProvider(user): RequireProvider,
    JsonBody(req): JsonBody<AdvertisementRequest>,
) -> Result<impl IntoResponse> {
    let ad = AdvertisementRepository::new(state.pool())
        .create(user.id, &req.fields()?)
        .await?;

    Ok((StatusCode::CREATED, Json(ad)))
}

/// PUT /api/advertisements/{id}
///
/// # Errors
///
/// 403 unless the caller owns the ad or is an admin.
pub async fn update(
    State(state): State<AppState>,
    RequireProvider(user): RequireProvider,
    PathParam(id): PathParam<AdvertisementId>,
    JsonBody(req): JsonBody<AdvertisementRequest>,
) -> Result<Json<Advertisement>> {
    owned_ad(&state, &user, id).await?;
    let ad = AdvertisementRepository::new(state.pool())
        .update(id, &req.fields()?)
        .await?;

    Ok(Json(ad))
}

/// DELETE /api/advertisements/{id}
///
/// # Errors
///
/// 403 unless the caller owns the ad or is an admin.
pub async fn remove(
    State(state): State<AppState>,
    RequireProvider(user): RequireProvider,
    PathParam(id): PathParam<AdvertisementId>,
) -> Result<StatusCode> {
    owned_ad(&state, &user, id).await?;
    AdvertisementRepository::new(state.pool()).delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn request(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> AdvertisementRequest {
        AdvertisementRequest {
            title: "Spring grooming".to_owned(),
            description: String::new(),
            image_url: "https://cdn.example.com/ad.png".to_owned(),
            link_url: Some("  ".to_owned()),
            starts_at,
            ends_at,
        }
    }

    #[test]
    fn test_window_must_be_forward() {
        let now = Utc::now();
        assert!(request(now, now).fields().is_err());
        assert!(request(now, now - Duration::days(1)).fields().is_err());

        let req = request(now, now + Duration::days(7));
        let fields = req.fields().unwrap();
        assert_eq!(fields.link_url, None);
    }
}
