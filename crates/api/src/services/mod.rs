//! Business logic shared by route handlers.
//!
//! - `access` - ownership checks
//! - `auth` - registration, login and bearer tokens
//! - `payments` - card fingerprinting

pub mod access;
pub mod auth;
pub mod payments;
