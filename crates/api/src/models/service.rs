//! Service listings and their package tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawgo_core::{PackageTier, Price, ServiceCategory, ServiceId, UserId};

/// One bookable tier of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub price: Price,
    pub duration_minutes: i32,
    #[serde(default)]
    pub inclusions: Vec<String>,
}

/// The three tiers every service offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packages {
    pub basic: Package,
    pub premium: Package,
    pub luxury: Package,
}

impl Packages {
    /// Tiers paired with their packages, in tier order.
    pub fn iter(&self) -> impl Iterator<Item = (PackageTier, &Package)> {
        [
            (PackageTier::Basic, &self.basic),
            (PackageTier::Premium, &self.premium),
            (PackageTier::Luxury, &self.luxury),
        ]
        .into_iter()
    }
}

/// A grooming, boarding or training listing owned by a provider.
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: ServiceId,
    pub provider_id: UserId,
    pub category: ServiceCategory,
    pub name: String,
    pub description: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub packages: Packages,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
