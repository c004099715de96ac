//! Database operations for the Pawgo `PostgreSQL` database.
//!
//! # Schema: `pawgo`
//!
//! ## Tables
//!
//! - `app_user` - Accounts, roles, password hashes and loyalty balances
//! - `pet` - Pets owned by accounts
//! - `service` / `service_package` - Provider listings and their three tiers
//! - `appointment` - Bookings of a pet onto a service tier
//! - `schedule` - Derived time slot for an appointment
//! - `payment` - Payments against appointments (no raw card data)
//! - `product` / `customer_order` - Marketplace inventory and orders
//! - `review`, `faq`, `advertisement` - Content records
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p pawgo-cli -- migrate
//! ```
//!
//! Queries use the runtime `sqlx::query_as` API with `FromRow` rows so the
//! crate builds without a live database.

pub mod advertisements;
pub mod appointments;
pub mod faqs;
pub mod orders;
pub mod payments;
pub mod pets;
pub mod products;
pub mod reviews;
pub mod services;
pub mod stats;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use advertisements::AdvertisementRepository;
pub use appointments::AppointmentRepository;
pub use faqs::FaqRepository;
pub use orders::OrderRepository;
pub use payments::PaymentRepository;
pub use pets::PetRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use services::ServiceRepository;
pub use stats::StatsRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, record still referenced).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A numeric value does not fit its column.
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

/// SQLSTATE `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE)
        {
            return Self::OutOfRange(db_err.message().to_owned());
        }
        Self::Database(e)
    }
}

impl RepositoryError {
    /// Classify a write error, turning unique and foreign key violations into
    /// [`RepositoryError::Conflict`] with `what` as the message.
    pub(crate) fn on_write(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            return Self::Conflict(what.to_owned());
        }
        Self::from(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
