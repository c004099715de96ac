//! Aggregate counts for the admin dashboard.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use pawgo_core::{AppointmentStatus, UserRole};

use super::RepositoryError;

/// Marketplace totals.
///
/// Every role and appointment status appears in its map, with zero when
/// nothing matches.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub users_by_role: BTreeMap<&'static str, i64>,
    pub appointments_by_status: BTreeMap<&'static str, i64>,
    pub products: i64,
    pub orders: i64,
    /// Sum of payments in the `paid` state.
    pub paid_revenue: Decimal,
}

pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn dashboard(&self) -> Result<DashboardStats, RepositoryError> {
        let roles: Vec<(UserRole, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM pawgo.app_user GROUP BY role")
                .fetch_all(self.pool)
                .await?;

        let statuses: Vec<(AppointmentStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM pawgo.appointment GROUP BY status")
                .fetch_all(self.pool)
                .await?;

        let (products, orders, paid_revenue): (i64, i64, Decimal) = sqlx::query_as(
            "SELECT \
               (SELECT COUNT(*) FROM pawgo.product), \
               (SELECT COUNT(*) FROM pawgo.customer_order), \
               (SELECT COALESCE(SUM(amount), 0) FROM pawgo.payment WHERE status = 'paid')",
        )
        .fetch_one(self.pool)
        .await?;

        let mut users_by_role: BTreeMap<_, _> =
            UserRole::ALL.iter().map(|r| (r.as_str(), 0)).collect();
        users_by_role.extend(roles.into_iter().map(|(r, n)| (r.as_str(), n)));

        let mut appointments_by_status: BTreeMap<_, _> =
            AppointmentStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        appointments_by_status.extend(statuses.into_iter().map(|(s, n)| (s.as_str(), n)));

        Ok(DashboardStats {
            users_by_role,
            appointments_by_status,
            products,
            orders,
            paid_revenue,
        })
    }
}
