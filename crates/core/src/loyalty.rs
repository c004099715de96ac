//! Loyalty point accrual and redemption.
//!
//! Pet owners earn points when a provider confirms one of their bookings and
//! can trade their whole balance for a percentage discount on a later booking.
//! Every 50 points is worth 5% off, up to 50%.

use crate::types::PackageTier;

/// Points needed for one discount step.
pub const POINTS_PER_STEP: i32 = 50;

/// Percent off granted per step.
pub const PERCENT_PER_STEP: u8 = 5;

/// Highest discount a balance can buy.
pub const MAX_DISCOUNT_PERCENT: u8 = 50;

/// Discount percentage a balance of `points` buys.
///
/// `min(floor(points / 50) * 5, 50)`. A negative balance buys nothing.
///
/// ```
/// use pawgo_core::loyalty::calculate_discount;
///
/// assert_eq!(calculate_discount(49), 0);
/// assert_eq!(calculate_discount(120), 10);
/// assert_eq!(calculate_discount(10_000), 50);
/// ```
#[must_use]
pub fn calculate_discount(points: i32) -> u8 {
    let steps = points.max(0) / POINTS_PER_STEP;
    let max_steps = i32::from(MAX_DISCOUNT_PERCENT / PERCENT_PER_STEP);
    // clamped to 0..=10, so the cast cannot truncate
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = steps.min(max_steps) as u8;
    steps * PERCENT_PER_STEP
}

/// Points credited for confirming a booking of the given package tier label.
///
/// Unrecognized labels earn nothing.
#[must_use]
pub fn calculate_loyalty_points(package_type: &str) -> i32 {
    package_type
        .parse::<PackageTier>()
        .map_or(0, |tier| tier.loyalty_points())
}

impl PackageTier {
    /// Points credited when a booking of this tier is confirmed.
    #[must_use]
    pub const fn loyalty_points(&self) -> i32 {
        match self {
            Self::Basic => 5,
            Self::Premium => 15,
            Self::Luxury => 25,
        }
    }
}

/// Outcome of redeeming a balance against a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redemption {
    /// Percent taken off the booking price.
    pub discount_percent: u8,
    /// Balance left on the account afterwards.
    pub remaining_points: i32,
}

/// Redeem an entire balance.
///
/// Redemption always empties the balance, including any remainder below the
/// next 50-point step.
#[must_use]
pub fn redeem(points: i32) -> Redemption {
    Redemption {
        discount_percent: calculate_discount(points),
        remaining_points: 0,
    }
}
