//! Admin dashboard routes.

use axum::{Json, Router, extract::State, routing::get};

use crate::db::StatsRepository;
use crate::db::stats::DashboardStats;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

/// GET /api/admin/stats
///
/// # Errors
///
/// 403 for non-admins.
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<DashboardStats>> {
    Ok(Json(StatsRepository::new(state.pool()).dashboard().await?))
}
