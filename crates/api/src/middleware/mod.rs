//! HTTP middleware and extractors.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (tags the span and Sentry scope)
//! 4. CORS
//! 5. Rate limiting on the credential routes only

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{RequireAdmin, RequireAuth, RequireProvider};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
