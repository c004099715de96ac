//! Service repository.
//!
//! A service row and its three `service_package` rows are always written
//! together in one transaction and read back as a single [`Service`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use pawgo_core::{PackageTier, Price, ServiceCategory, ServiceId, UserId};

use super::RepositoryError;
use crate::models::{Package, Packages, Service};

macro_rules! service_columns {
    () => {
        "id, provider_id, category, name, description, location, image_url, created_at, updated_at"
    };
}

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: ServiceId,
    provider_id: UserId,
    category: ServiceCategory,
    name: String,
    description: String,
    location: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PackageRow {
    service_id: ServiceId,
    tier: PackageTier,
    price: Price,
    duration_minutes: i32,
    inclusions: Vec<String>,
}

/// Service fields as written on create and update.
pub struct ServiceFields<'a> {
    pub category: ServiceCategory,
    pub name: &'a str,
    pub description: &'a str,
    pub location: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub packages: &'a Packages,
}

/// Repository for service database operations.
pub struct ServiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ServiceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a package tier is missing.
    pub async fn get(&self, id: ServiceId) -> Result<Option<Service>, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(concat!(
            "SELECT ",
            service_columns!(),
            " FROM pawgo.service WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_packages(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// List services, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a package tier is missing.
    pub async fn list(
        &self,
        category: Option<ServiceCategory>,
    ) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServiceRow>(concat!(
            "SELECT ",
            service_columns!(),
            " FROM pawgo.service WHERE ($1::pawgo.service_category IS NULL OR category = $1) ",
            "ORDER BY id"
        ))
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        self.attach_packages(rows).await
    }

    /// Services listed by `provider`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a package tier is missing.
    pub async fn list_for_provider(&self, provider: UserId) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServiceRow>(concat!(
            "SELECT ",
            service_columns!(),
            " FROM pawgo.service WHERE provider_id = $1 ORDER BY id"
        ))
        .bind(provider)
        .fetch_all(self.pool)
        .await?;

        self.attach_packages(rows).await
    }

    /// Create a service with its three packages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(
        &self,
        provider: UserId,
        fields: &ServiceFields<'_>,
    ) -> Result<Service, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ServiceRow>(concat!(
            "INSERT INTO pawgo.service (provider_id, category, name, description, location, image_url) ",
            "VALUES ($1, $2, $3, $4, $5, $6) RETURNING ",
            service_columns!()
        ))
        .bind(provider)
        .bind(fields.category)
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.location)
        .bind(fields.image_url)
        .fetch_one(&mut *tx)
        .await?;

        write_packages(&mut tx, row.id, fields.packages).await?;
        tx.commit().await?;

        Ok(assemble(row, fields.packages.clone()))
    }

    /// Replace a service's fields and packages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the service doesn't exist.
    /// Returns `RepositoryError::Database` if any write fails.
    pub async fn update(
        &self,
        id: ServiceId,
        fields: &ServiceFields<'_>,
    ) -> Result<Service, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ServiceRow>(concat!(
            "UPDATE pawgo.service SET category = $2, name = $3, description = $4, ",
            "location = $5, image_url = $6, updated_at = now() WHERE id = $1 RETURNING ",
            service_columns!()
        ))
        .bind(id)
        .bind(fields.category)
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.location)
        .bind(fields.image_url)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        write_packages(&mut tx, row.id, fields.packages).await?;
        tx.commit().await?;

        Ok(assemble(row, fields.packages.clone()))
    }

    /// Delete a service and its packages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the service doesn't exist.
    /// Returns `RepositoryError::Conflict` if the service has appointments or reviews.
    pub async fn delete(&self, id: ServiceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pawgo.service WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::on_write(e, "service has appointments or reviews"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn attach_packages(&self, rows: Vec<ServiceRow>) -> Result<Vec<Service>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let packages = sqlx::query_as::<_, PackageRow>(
            "SELECT service_id, tier, price, duration_minutes, inclusions \
             FROM pawgo.service_package WHERE service_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_service: HashMap<ServiceId, Vec<PackageRow>> = HashMap::new();
        for package in packages {
            by_service.entry(package.service_id).or_default().push(package);
        }

        rows.into_iter()
            .map(|row| {
                let packages = collect_packages(row.id, by_service.remove(&row.id).unwrap_or_default())?;
                Ok(assemble(row, packages))
            })
            .collect()
    }
}

async fn write_packages(
    tx: &mut Transaction<'_, Postgres>,
    service: ServiceId,
    packages: &Packages,
) -> Result<(), RepositoryError> {
    for (tier, package) in packages.iter() {
        sqlx::query(
            "INSERT INTO pawgo.service_package (service_id, tier, price, duration_minutes, inclusions) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (service_id, tier) DO UPDATE SET \
             price = EXCLUDED.price, duration_minutes = EXCLUDED.duration_minutes, \
             inclusions = EXCLUDED.inclusions",
        )
        .bind(service)
        .bind(tier)
        .bind(package.price)
        .bind(package.duration_minutes)
        .bind(&package.inclusions)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn collect_packages(service: ServiceId, rows: Vec<PackageRow>) -> Result<Packages, RepositoryError> {
    let mut tiers: HashMap<PackageTier, Package> = rows
        .into_iter()
        .map(|r| {
            (
                r.tier,
                Package {
                    price: r.price,
                    duration_minutes: r.duration_minutes,
                    inclusions: r.inclusions,
                },
            )
        })
        .collect();

    let mut take = |tier: PackageTier| {
        tiers.remove(&tier).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("service {service} has no {tier} package"))
        })
    };

    Ok(Packages {
        basic: take(PackageTier::Basic)?,
        premium: take(PackageTier::Premium)?,
        luxury: take(PackageTier::Luxury)?,
    })
}

fn assemble(row: ServiceRow, packages: Packages) -> Service {
    Service {
        id: row.id,
        provider_id: row.provider_id,
        category: row.category,
        name: row.name,
        description: row.description,
        location: row.location,
        image_url: row.image_url,
        packages,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
