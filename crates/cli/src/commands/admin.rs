//! Admin account management commands.
//!
//! Admin is never a self-service role, so the first admin (and any after
//! it) is created here.
//!
//! # Usage
//!
//! ```bash
//! pawgo-cli admin create -e admin@pawgo.pet -n "Admin Name" -p '...'
//! ```

use pawgo_api::db;
use pawgo_api::services::auth::{AuthError, AuthService, Registration};
use pawgo_core::UserRole;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation or persistence failure.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new admin account.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `name` - Admin's display name
/// * `password` - Password, or `None` to read `PAWGO_ADMIN_PASSWORD`
///
/// # Errors
///
/// Returns `AdminError` for a missing password or database URL, an invalid
/// email, name or password, or an email that is already registered.
pub async fn create_admin(
    email: &str,
    name: &str,
    password: Option<String>,
) -> Result<(), AdminError> {
    let database_url =
        super::database_url().ok_or(AdminError::MissingEnvVar("PAWGO_DATABASE_URL"))?;

    let password = password
        .or_else(|| std::env::var("PAWGO_ADMIN_PASSWORD").ok())
        .map(SecretString::from)
        .ok_or(AdminError::MissingEnvVar("PAWGO_ADMIN_PASSWORD"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let user = AuthService::new(&pool)
        .create_account(&Registration {
            name,
            email,
            password: password.expose_secret(),
            role: UserRole::Admin,
            phone: None,
            address: None,
        })
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Admin account created");
    Ok(())
}
