//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database ping)
//!
//! /api/users            register, login, profile, loyalty, admin user management
//! /api/users/pets       pets of the current user
//! /api/services         grooming, boarding and training listings
//! /api/appointments     bookings, status changes and schedules
//! /api/payments         payments against appointments
//! /api/products         marketplace inventory
//! /api/orders           marketplace orders
//! /api/reviews          service reviews
//! /api/faqs             FAQ entries
//! /api/advertisements   banner ads
//! /api/admin            dashboard stats
//! ```
//!
//! Each module exposes a `router()`; the tables in each module's docs list its
//! endpoints.

pub mod admin;
pub mod advertisements;
pub mod appointments;
pub mod faqs;
pub mod orders;
pub mod payments;
pub mod pets;
pub mod products;
pub mod reviews;
pub mod services;
pub mod users;

use axum::{
    Router,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::state::AppState;

/// Create all `/api` routes.
///
/// `trust_proxy_headers` decides whether the auth rate limiter keys on
/// forwarding headers or on the socket peer.
pub fn routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .nest("/users", users::router(trust_proxy_headers))
        .nest("/services", services::router())
        .nest("/appointments", appointments::router())
        .nest("/payments", payments::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/reviews", reviews::router())
        .nest("/faqs", faqs::router())
        .nest("/advertisements", advertisements::router())
        .nest("/admin", admin::router())
}

/// JSON request body whose rejections use the API's error format.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| Self(value))
            .map_err(|rejection: JsonRejection| AppError::BadRequest(rejection.body_text()))
    }
}

/// Path parameters whose rejections use the API's error format.
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|rejection: PathRejection| AppError::BadRequest(rejection.body_text()))
    }
}

/// Query string whose rejections use the API's error format.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection: QueryRejection| AppError::BadRequest(rejection.body_text()))
    }
}

/// Heaviest pet weight accepted, 9,999.99 kg (a `NUMERIC(6, 2)` column).
pub(crate) const MAX_WEIGHT_KG: Decimal = Decimal::from_parts(999_999, 0, 0, false, 2);

/// An optional weight in kilograms: positive, at most two decimal places and
/// no more than [`MAX_WEIGHT_KG`].
pub(crate) fn weight_kg(field: &str, value: Option<Decimal>) -> Result<Option<Decimal>, AppError> {
    let Some(weight) = value else {
        return Ok(None);
    };
    if weight <= Decimal::ZERO {
        return Err(AppError::BadRequest(format!("{field} must be positive")));
    }
    if weight.normalize().scale() > 2 {
        return Err(AppError::BadRequest(format!(
            "{field} can have at most two decimal places"
        )));
    }
    if weight > MAX_WEIGHT_KG {
        return Err(AppError::BadRequest(format!(
            "{field} cannot exceed {MAX_WEIGHT_KG}"
        )));
    }
    Ok(Some(weight))
}

/// A required text field, trimmed. Empty values are rejected.
pub(crate) fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value)
}

/// An optional text field, trimmed, with blank treated as absent.
pub(crate) fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use axum::{
        body::Body,
        http::{StatusCode, header},
        routing::get,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Deserialize)]
    struct Page {
        page: u32,
    }

    async fn by_id(PathParam(id): PathParam<i32>) -> String {
        id.to_string()
    }

    async fn paged(QueryParams(query): QueryParams<Page>) -> String {
        query.page.to_string()
    }

    async fn send(uri: &str) -> (StatusCode, Option<String>, serde_json::Value) {
        let app: Router = Router::new()
            .route("/items/{id}", get(by_id))
            .route("/items", get(paged));
        let res = app
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let content_type = res
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_owned());
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, content_type, body)
    }

    #[tokio::test]
    async fn test_bad_path_param_is_json_error() {
        let (status, content_type, body) = send("/items/not-a-number").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_bad_query_is_json_error() {
        let (status, content_type, body) = send("/items?page=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_valid_params_pass_through() {
        let (status, _, body) = send("/items/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!(42));
        let (status, _, _) = send("/items?page=2").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn test_weight_bounds() {
        let dec = |s| Decimal::from_str(s).unwrap();
        assert_eq!(weight_kg("weight_kg", None).unwrap(), None);
        assert_eq!(weight_kg("weight_kg", Some(dec("4.5"))).unwrap(), Some(dec("4.5")));
        assert_eq!(MAX_WEIGHT_KG, dec("9999.99"));
        assert!(weight_kg("weight_kg", Some(MAX_WEIGHT_KG)).is_ok());
        assert!(weight_kg("weight_kg", Some(dec("0"))).is_err());
        assert!(weight_kg("weight_kg", Some(dec("-2"))).is_err());
        assert!(weight_kg("weight_kg", Some(dec("1.005"))).is_err());
        let err = weight_kg("weight_kg", Some(dec("10000"))).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: weight_kg cannot exceed 9999.99");
    }

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Biscuit ").ok(), Some("Biscuit"));
        let err = required("name", "   ").unwrap_err();
        assert_eq!(err.to_string(), "Bad request: name is required");
    }

    #[test]
    fn test_optional_drops_blank() {
        assert_eq!(optional(Some(" tabby ")), Some("tabby"));
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(None), None);
    }
}
