//! Payment card validation.
//!
//! Card data arrives with a payment request, is checked here, and is then
//! reduced to a brand, the last four digits and a keyed fingerprint. The full
//! number, expiry and CVV are never stored. Debug output redacts them.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Why a card was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("card number must be 12 to 19 digits")]
    NumberLength,
    #[error("card number may only contain digits, spaces and dashes")]
    NumberCharacters,
    #[error("card number failed checksum")]
    Checksum,
    #[error("expiry month must be between 1 and 12")]
    ExpiryMonth,
    #[error("card has expired")]
    Expired,
    #[error("security code must be 3 or 4 digits")]
    Cvv,
    #[error("cardholder name cannot be empty")]
    HolderName,
}

/// Card network, derived from the number's prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Unknown,
}

impl CardBrand {
    fn detect(digits: &str) -> Self {
        let prefix = |n: usize| digits.get(..n).and_then(|p| p.parse::<u32>().ok());

        if digits.starts_with('4') {
            Self::Visa
        } else if matches!(prefix(2), Some(34 | 37)) {
            Self::Amex
        } else if matches!(prefix(2), Some(51..=55)) || matches!(prefix(4), Some(2221..=2720)) {
            Self::Mastercard
        } else if digits.starts_with("6011")
            || digits.starts_with("65")
            || matches!(prefix(3), Some(644..=649))
        {
            Self::Discover
        } else {
            Self::Unknown
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Discover => "discover",
            Self::Unknown => "unknown",
        }
    }
}

/// Raw card details as submitted by the client.
#[derive(Clone, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cvv: String,
    pub holder_name: String,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &"[REDACTED]")
            .field("expiry", &"[REDACTED]")
            .field("cvv", &"[REDACTED]")
            .field("holder_name", &self.holder_name)
            .finish()
    }
}

/// A card that passed validation.
#[derive(Clone)]
pub struct ValidatedCard {
    digits: String,
    brand: CardBrand,
    holder_name: String,
}

impl std::fmt::Debug for ValidatedCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedCard")
            .field("brand", &self.brand)
            .field("last4", &self.last4())
            .finish_non_exhaustive()
    }
}

impl CardDetails {
    /// Validate the card as of `today`.
    ///
    /// A card is usable through the last day of its expiry month. Two-digit
    /// years are read as 20xx.
    ///
    /// # Errors
    ///
    /// Returns the first [`CardError`] the card fails.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedCard, CardError> {
        let mut digits = String::with_capacity(self.number.len());
        for c in self.number.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' => {}
                _ => return Err(CardError::NumberCharacters),
            }
        }
        if !(12..=19).contains(&digits.len()) {
            return Err(CardError::NumberLength);
        }
        if !luhn_valid(&digits) {
            return Err(CardError::Checksum);
        }

        if !(1..=12).contains(&self.expiry_month) {
            return Err(CardError::ExpiryMonth);
        }
        let year = if self.expiry_year < 100 {
            self.expiry_year + 2000
        } else {
            self.expiry_year
        };
        if (year, self.expiry_month) < (today.year(), today.month()) {
            return Err(CardError::Expired);
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CardError::Cvv);
        }

        let holder_name = self.holder_name.trim();
        if holder_name.is_empty() {
            return Err(CardError::HolderName);
        }

        Ok(ValidatedCard {
            brand: CardBrand::detect(&digits),
            digits,
            holder_name: holder_name.to_owned(),
        })
    }
}

impl ValidatedCard {
    #[must_use]
    pub const fn brand(&self) -> CardBrand {
        self.brand
    }

    /// Last four digits, safe to store and display.
    #[must_use]
    pub fn last4(&self) -> &str {
        self.digits
            .get(self.digits.len().saturating_sub(4)..)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    /// The bare card number, for keyed fingerprinting only.
    #[must_use]
    pub fn fingerprint_input(&self) -> &[u8] {
        self.digits.as_bytes()
    }
}

/// Luhn mod-10 checksum over an all-digit string.
#[must_use]
pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (i, b) in digits.bytes().rev().enumerate() {
        if !b.is_ascii_digit() {
            return false;
        }
        let mut d = u32::from(b - b'0');
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    !digits.is_empty() && sum % 10 == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    fn card(number: &str) -> CardDetails {
        CardDetails {
            number: number.to_owned(),
            expiry_month: 8,
            expiry_year: 2028,
            cvv: "123".to_owned(),
            holder_name: "Sam Whiskers".to_owned(),
        }
    }

    #[test]
    fn test_brands_and_last4() {
        let cases = [
            ("4242 4242 4242 4242", CardBrand::Visa, "4242"),
            ("5555-5555-5555-4444", CardBrand::Mastercard, "4444"),
            ("2223003122003222", CardBrand::Mastercard, "3222"),
            ("378282246310005", CardBrand::Amex, "0005"),
            ("6011111111111117", CardBrand::Discover, "1117"),
        ];
        for (number, brand, last4) in cases {
            let validated = card(number).validate(today()).unwrap();
            assert_eq!(validated.brand(), brand, "{number}");
            assert_eq!(validated.last4(), last4);
        }
    }

    #[test]
    fn test_number_rules() {
        assert_eq!(
            card("4242424242424241").validate(today()).unwrap_err(),
            CardError::Checksum
        );
        assert_eq!(
            card("4242").validate(today()).unwrap_err(),
            CardError::NumberLength
        );
        assert_eq!(
            card("4242x42424242424").validate(today()).unwrap_err(),
            CardError::NumberCharacters
        );
    }

    #[test]
    fn test_expiry_is_inclusive_of_current_month() {
        let mut c = card("4242424242424242");
        c.expiry_month = 6;
        c.expiry_year = 2026;
        assert!(c.validate(today()).is_ok());

        c.expiry_month = 5;
        assert_eq!(c.validate(today()).unwrap_err(), CardError::Expired);

        c.expiry_month = 13;
        assert_eq!(c.validate(today()).unwrap_err(), CardError::ExpiryMonth);

        c.expiry_month = 1;
        c.expiry_year = 27;
        assert!(c.validate(today()).is_ok());
    }

    #[test]
    fn test_cvv_and_holder() {
        let mut c = card("4242424242424242");
        c.cvv = "12".to_owned();
        assert_eq!(c.validate(today()).unwrap_err(), CardError::Cvv);
        c.cvv = "12a".to_owned();
        assert_eq!(c.validate(today()).unwrap_err(), CardError::Cvv);
        c.cvv = "1234".to_owned();
        c.holder_name = "   ".to_owned();
        assert_eq!(c.validate(today()).unwrap_err(), CardError::HolderName);
    }

    #[test]
    fn test_debug_redacts_card_data() {
        let c = card("4242424242424242");
        let raw = format!("{c:?}");
        assert!(!raw.contains("4242424242424242"));
        assert!(!raw.contains("123"));

        let validated = c.validate(today()).unwrap();
        let shown = format!("{validated:?}");
        assert!(!shown.contains("4242424242424242"));
        assert!(shown.contains("4242"));
    }
}
