//! Service listing routes.
//!
//! ```text
//! GET    /api/services                - Public, optional ?category=
//! GET    /api/services/mine           - Current provider's services
//! GET    /api/services/{id}           - Public
//! POST   /api/services                - Provider or admin
//! PUT    /api/services/{id}           - Owning provider or admin
//! DELETE /api/services/{id}           - Owning provider or admin
//! ```

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use pawgo_core::{ServiceCategory, ServiceId};

use super::{JsonBody, PathParam, QueryParams, optional, required};
use crate::db::ServiceRepository;
use crate::db::services::ServiceFields;
use crate::error::{AppError, Result};
use crate::middleware::RequireProvider;
use crate::models::{CurrentUser, Packages, Service};
use crate::services::access::ensure_owner;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/mine", get(mine))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<ServiceCategory>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceRequest {
    pub category: ServiceCategory,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub packages: Packages,
}

impl ServiceRequest {
    fn fields(&self) -> Result<ServiceFields<'_>> {
        validate_packages(&self.packages)?;

        Ok(ServiceFields {
            category: self.category,
            name: required("name", &self.name)?,
            description: self.description.trim(),
            location: optional(self.location.as_deref()),
            image_url: optional(self.image_url.as_deref()),
            packages: &self.packages,
        })
    }
}

/// Every tier needs a positive price and duration.
fn validate_packages(packages: &Packages) -> Result<()> {
    for (tier, package) in packages.iter() {
        if package.price.amount().is_zero() {
            return Err(AppError::BadRequest(format!("{tier} price must be positive")));
        }
        if package.duration_minutes <= 0 {
            return Err(AppError::BadRequest(format!(
                "{tier} duration_minutes must be positive"
            )));
        }
    }
    Ok(())
}

async fn owned_service(state: &AppState, user: &CurrentUser, id: ServiceId) -> Result<Service> {
    let service = ServiceRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("service"))?;
    ensure_owner(user, service.provider_id, "service")?;
    Ok(service)
}

/// GET /api/services
///
/// # Errors
///
/// 400 for an unknown category.
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Vec<Service>>> {
    Ok(Json(ServiceRepository::new(state.pool()).list(query.category).await?))
}

/// GET /api/services/mine
///
/// # Errors
///
/// 403 for pet owners.
pub async fn mine(
    State(state): State<AppState>,
    RequireProvider(user): RequireProvider,
) -> Result<Json<Vec<Service>>> {
    Ok(Json(
        ServiceRepository::new(state.pool())
            .list_for_provider(user.id)
            .await?,
    ))
}

/// GET /api/services/{id}
///
/// # Errors
///
/// 404 if unknown.
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<ServiceId>,
) -> Result<Json<Service>> {
    ServiceRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("service"))
}

/// POST /api/services
///
/// # Errors
///
/// 403 for pet owners, 400 for invalid fields.
pub async fn create(
    State(state): State<AppState>,
    RequireProvider(user): RequireProvider,
    JsonBody(req): JsonBody<ServiceRequest>,
) -> Result<impl IntoResponse> {
    let service = ServiceRepository::new(state.pool())
        .create(user.id, &req.fields()?)
        .await?;

    tracing::info!(service_id = %service.id, provider_id = %user.id, "Service created");

    Ok((StatusCode::CREATED, Json(service)))
}

/// PUT /api/services/{id}
///
/// # Errors
///
/// 403 unless the caller owns the service or is an admin.
pub async fn update(
    State(state): State<AppState>,
    RequireProvider(user): RequireProvider,
    PathParam(id): PathParam<ServiceId>,
    JsonBody(req): JsonBody<ServiceRequest>,
) -> Result<Json<Service>> {
    owned_service(&state, &user, id).await?;
    let service = ServiceRepository::new(state.pool())
        .update(id, &req.fields()?)
        .await?;

    Ok(Json(service))
}

/// DELETE /api/services/{id}
///
/// # Errors
///
/// 403 unless the caller owns the service or is an admin, 409 while it has
/// appointments or reviews.
pub async fn remove(
    State(state): State<AppState>,
    RequireProvider(user): RequireProvider,
    PathParam(id): PathParam<ServiceId>,
) -> Result<StatusCode> {
    owned_service(&state, &user, id).await?;
    ServiceRepository::new(state.pool()).delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pawgo_core::Price;

    use super::*;
    use crate::models::Package;

    fn package(cents: u32, minutes: i32) -> Package {
        Package {
            price: Price::from_cents(cents),
            duration_minutes: minutes,
            inclusions: Vec::new(),
        }
    }

    #[test]
    fn test_packages_need_positive_price_and_duration() {
        let ok = Packages {
            basic: package(1500, 30),
            premium: package(3000, 60),
            luxury: package(6000, 120),
        };
        assert!(validate_packages(&ok).is_ok());

        let free = Packages {
            premium: package(0, 60),
            ..ok.clone()
        };
        assert_eq!(
            validate_packages(&free).unwrap_err().to_string(),
            "Bad request: premium price must be positive"
        );

        let instant = Packages {
            luxury: package(6000, 0),
            ..ok
        };
        assert!(validate_packages(&instant).is_err());
    }
}
