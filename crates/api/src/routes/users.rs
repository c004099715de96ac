//! Account routes.
//!
//! ```text
//! POST   /api/users/register     - Create account, returns a token
//! POST   /api/users/login        - Exchange credentials for a token
//! GET    /api/users/profile      - Current user
//! PUT    /api/users/profile      - Update name, phone, address
//! GET    /api/users/loyalty      - Points balance and the discount it buys
//! GET    /api/users              - All users (admin)
//! PATCH  /api/users/{id}/role    - Change a role (admin)
//! DELETE /api/users/{id}         - Delete an account (admin)
//! ```

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};

use pawgo_core::loyalty::calculate_discount;
use pawgo_core::{UserId, UserRole};

use super::{JsonBody, PathParam, optional, pets};
use crate::db::UserRepository;
use crate::db::users::ProfileUpdate;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth, auth_rate_limiter};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// Build the account router.
///
/// Registration and login sit behind the credential rate limiter.
pub fn router(trust_proxy_headers: bool) -> Router<AppState> {
    let credentials = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route_layer(auth_rate_limiter(trust_proxy_headers));

    Router::new()
        .merge(credentials)
        .route("/profile", get(profile).put(update_profile))
        .route("/loyalty", get(loyalty))
        .route("/", get(list))
        .route("/{id}/role", patch(set_role))
        .route("/{id}", delete(remove))
        .nest("/pets", pets::router())
}

// ============================================================================
// Registration and login
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
    pub phone: Option<String>,
    pub address: Option<String>,
}

const fn default_role() -> UserRole {
    UserRole::PetOwner
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token and account returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: User,
}

fn auth_response(state: &AppState, user: User) -> Result<AuthResponse> {
    let issued = state.tokens().issue(CurrentUser {
        id: user.id,
        role: user.role,
    })?;

    Ok(AuthResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user,
    })
}

/// POST /api/users/register
///
/// # Errors
///
/// 400 for invalid fields or the admin role, 409 for a taken email.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .register(&Registration {
            name: &req.name,
            email: &req.email,
            password: &req.password,
            role: req.role,
            phone: optional(req.phone.as_deref()),
            address: optional(req.address.as_deref()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(auth_response(&state, user)?)))
}

/// POST /api/users/login
///
/// # Errors
///
/// 401 for unknown email or wrong password.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = AuthService::new(state.pool())
        .login(&req.email, &req.password)
        .await
        .inspect_err(|_| tracing::info!("Failed login attempt"))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(auth_response(&state, user)?))
}

// ============================================================================
// Profile
// ============================================================================

async fn current_user(state: &AppState, id: UserId) -> Result<User> {
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))
}

/// GET /api/users/profile
///
/// # Errors
///
/// 404 if the account was deleted after the token was issued.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<User>> {
    Ok(Json(current_user(&state, user.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// PUT /api/users/profile
///
/// Absent fields are left unchanged.
///
/// # Errors
///
/// 400 for a blank name.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(req): JsonBody<ProfileRequest>,
) -> Result<Json<User>> {
    let name = match req.name.as_deref() {
        Some(name) => Some(super::required("name", name)?),
        None => None,
    };

    let updated = UserRepository::new(state.pool())
        .update_profile(
            user.id,
            &ProfileUpdate {
                name,
                phone: optional(req.phone.as_deref()),
                address: optional(req.address.as_deref()),
            },
        )
        .await?;

    Ok(Json(updated))
}

#[derive(Debug, Serialize)]
pub struct LoyaltyResponse {
    pub points: i32,
    /// Percent that redeeming the balance now would take off a booking.
    pub discount_percent: u8,
}

/// GET /api/users/loyalty
///
/// # Errors
///
/// 404 if the account no longer exists.
pub async fn loyalty(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<LoyaltyResponse>> {
    let user = current_user(&state, user.id).await?;

    Ok(Json(LoyaltyResponse {
        points: user.loyalty_points,
        discount_percent: calculate_discount(user.loyalty_points),
    }))
}

// ============================================================================
// Administration
// ============================================================================

/// GET /api/users
///
/// # Errors
///
/// 403 for non-admins.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(UserRepository::new(state.pool()).list().await?))
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

/// PATCH /api/users/{id}/role
///
/// The new role applies to tokens issued after the change.
///
/// # Errors
///
/// 403 for non-admins, 404 for an unknown user.
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<UserId>,
    JsonBody(req): JsonBody<RoleRequest>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .set_role(id, req.role)
        .await?;

    tracing::info!(admin_id = %admin.id, user_id = %id, role = %req.role, "Role changed");

    Ok(Json(user))
}

/// DELETE /api/users/{id}
///
/// # Errors
///
/// 400 when an admin targets their own account, 404 for an unknown user,
/// 409 when the user still owns records.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<UserId>,
) -> Result<StatusCode> {
    if id == admin.id {
        return Err(AppError::BadRequest(
            "admins cannot delete their own account".to_owned(),
        ));
    }

    UserRepository::new(state.pool()).delete(id).await?;
    tracing::info!(admin_id = %admin.id, user_id = %id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
