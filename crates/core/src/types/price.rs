//! Money amounts using decimal arithmetic.
//!
//! The marketplace trades in a single currency, so a price is just a
//! non-negative decimal with at most two fractional digits.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price cannot be negative")]
    Negative,
    #[error("price must be greater than zero")]
    Zero,
    #[error("price can have at most two decimal places")]
    TooPrecise,
    #[error("price cannot exceed {}", Price::MAX.0)]
    TooLarge,
}

/// A non-negative amount of money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest storable amount, 99,999,999.99 (a `NUMERIC(10, 2)` column).
    pub const MAX: Self = Self(Decimal::from_parts(0x540B_E3FF, 2, 0, false, 2));

    /// Build a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for negative amounts,
    /// [`PriceError::TooPrecise`] for sub-cent amounts and
    /// [`PriceError::TooLarge`] above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount.normalize().scale() > 2 {
            return Err(PriceError::TooPrecise);
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Build a price that must be strictly positive (listed prices).
    ///
    /// # Errors
    ///
    /// Same as [`Price::new`], plus [`PriceError::Zero`].
    pub fn positive(amount: Decimal) -> Result<Self, PriceError> {
        let price = Self::new(amount)?;
        if price.0.is_zero() {
            return Err(PriceError::Zero);
        }
        Ok(price)
    }

    /// Build a price from an integer number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Take `percent` off, rounding half-up to the cent.
    ///
    /// Percentages above 100 are clamped to 100.
    ///
    /// ```
    /// use pawgo_core::Price;
    ///
    /// let price = Price::from_cents(4999);
    /// assert_eq!(price.discounted(10), Price::from_cents(4499));
    /// assert_eq!(price.discounted(0), price);
    /// ```
    #[must_use]
    pub fn discounted(&self, percent: u8) -> Self {
        let percent = Decimal::from(percent.min(100));
        let off = self.0 * percent / Decimal::ONE_HUNDRED;
        let result = (self.0 - off)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self(result.max(Decimal::ZERO))
    }

    /// Multiply by a positive quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_new_validation() {
        assert!(Price::new(dec("0")).is_ok());
        assert!(Price::new(dec("12.50")).is_ok());
        assert!(Price::new(dec("12.500")).is_ok());
        assert_eq!(Price::new(dec("-1")), Err(PriceError::Negative));
        assert_eq!(Price::new(dec("1.005")), Err(PriceError::TooPrecise));
        assert_eq!(Price::positive(dec("0.00")), Err(PriceError::Zero));
    }

    #[test]
    fn test_upper_bound_matches_column() {
        assert_eq!(Price::MAX.amount(), dec("99999999.99"));
        assert!(Price::new(dec("99999999.99")).is_ok());
        assert_eq!(Price::new(dec("100000000")), Err(PriceError::TooLarge));
        assert_eq!(Price::new(dec("1000000000000")), Err(PriceError::TooLarge));
        assert!(serde_json::from_str::<Price>("\"123456789012\"").is_err());
    }

    #[test]
    fn test_discount_rounds_to_cents() {
        let price = Price::new(dec("33.33")).unwrap();
        // 33.33 * 0.85 = 28.3305
        assert_eq!(price.discounted(15).amount(), dec("28.33"));
        assert_eq!(price.discounted(100), Price::ZERO);
        assert_eq!(price.discounted(250), Price::ZERO);
    }

    #[test]
    fn test_times() {
        assert_eq!(Price::from_cents(1250).times(3), Price::from_cents(3750));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Price::from_cents(1999)).unwrap();
        assert_eq!(json, "\"19.99\"");
        let parsed: Price = serde_json::from_str("\"19.99\"").unwrap();
        assert_eq!(parsed, Price::from_cents(1999));
        assert!(serde_json::from_str::<Price>("\"-3\"").is_err());
    }
}
