//! Domain models for the Pawgo API.
//!
//! Row-shaped records derive `sqlx::FromRow` and `Serialize` directly; records
//! assembled from several tables (services with their packages) are built in
//! the repository layer.

pub mod advertisement;
pub mod appointment;
pub mod faq;
pub mod identity;
pub mod order;
pub mod payment;
pub mod pet;
pub mod product;
pub mod review;
pub mod service;
pub mod user;

pub use advertisement::Advertisement;
pub use appointment::{Appointment, Schedule};
pub use faq::Faq;
pub use identity::CurrentUser;
pub use order::Order;
pub use payment::Payment;
pub use pet::Pet;
pub use product::Product;
pub use review::Review;
pub use service::{Package, Packages, Service};
pub use user::User;
