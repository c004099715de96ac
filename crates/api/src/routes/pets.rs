//! Pet routes, nested under `/api/users/pets`.
//!
//! ```text
//! GET    /api/users/pets        - Current user's pets
//! POST   /api/users/pets        - Add a pet
//! GET    /api/users/pets/{id}   - Owner or admin
//! PUT    /api/users/pets/{id}   - Owner or admin
//! DELETE /api/users/pets/{id}   - Owner or admin
//! ```

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use pawgo_core::PetId;

use super::{JsonBody, PathParam, optional, required, weight_kg};
use crate::db::PetRepository;
use crate::db::pets::PetFields;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Pet};
use crate::services::access::ensure_owner;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct PetRequest {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age_years: Option<i32>,
    pub weight_kg: Option<Decimal>,
    pub image_url: Option<String>,
}

impl PetRequest {
    fn fields(&self) -> Result<PetFields<'_>> {
        if self.age_years.is_some_and(|age| age < 0) {
            return Err(AppError::BadRequest("age_years cannot be negative".to_owned()));
        }

        Ok(PetFields {
            name: required("name", &self.name)?,
            species: required("species", &self.species)?,
            breed: optional(self.breed.as_deref()),
            age_years: self.age_years,
            weight_kg: weight_kg("weight_kg", self.weight_kg)?,
            image_url: optional(self.image_url.as_deref()),
        })
    }
}

/// Load a pet the caller may act on.
async fn owned_pet(state: &AppState, user: &CurrentUser, id: PetId) -> Result<Pet> {
    let pet = PetRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("pet"))?;
    ensure_owner(user, pet.owner_id, "pet")?;
    Ok(pet)
}

/// GET /api/users/pets
///
/// # Errors
///
/// 401 without a token.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Pet>>> {
    Ok(Json(PetRepository::new(state.pool()).list_for_owner(user.id).await?))
}

/// POST /api/users/pets
///
/// # Errors
///
/// 400 for missing name/species or out-of-range numbers.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(req): JsonBody<PetRequest>,
) -> Result<impl IntoResponse> {
    let pet = PetRepository::new(state.pool())
        .create(user.id, &req.fields()?)
        .await?;

    Ok((StatusCode::CREATED, Json(pet)))
}

/// GET /api/users/pets/{id}
///
/// # Errors
///
/// 403 for someone else's pet, 404 if unknown.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<PetId>,
) -> Result<Json<Pet>> {
    Ok(Json(owned_pet(&state, &user, id).await?))
}

/// PUT /api/users/pets/{id}
///
/// # Errors
///
/// 403 for someone else's pet, 404 if unknown, 400 for invalid fields.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<PetId>,
    JsonBody(req): JsonBody<PetRequest>,
) -> Result<Json<Pet>> {
    owned_pet(&state, &user, id).await?;
    let pet = PetRepository::new(state.pool())
        .update(id, &req.fields()?)
        .await?;

    Ok(Json(pet))
}

/// DELETE /api/users/pets/{id}
///
/// # Errors
///
/// 403 for someone else's pet, 404 if unknown, 409 if it has appointments.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<PetId>,
) -> Result<StatusCode> {
    owned_pet(&state, &user, id).await?;
    PetRepository::new(state.pool()).delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn request(weight: &str) -> PetRequest {
        PetRequest {
            name: "Biscuit".to_owned(),
            species: "dog".to_owned(),
            breed: None,
            age_years: Some(4),
            weight_kg: Some(Decimal::from_str(weight).unwrap()),
            image_url: None,
        }
    }

    #[test]
    fn test_weight_must_fit_the_column() {
        assert!(request("12.40").fields().is_ok());
        assert!(request("9999.99").fields().is_ok());

        let err = request("10000").fields().err().unwrap();
        assert_eq!(err.to_string(), "Bad request: weight_kg cannot exceed 9999.99");
        assert!(request("0").fields().is_err());
    }

    #[test]
    fn test_negative_age_is_rejected() {
        let mut req = request("3");
        req.age_years = Some(-1);
        assert!(req.fields().is_err());
    }
}
