//! Card fingerprinting for stored payments.
//!
//! The fingerprint is an HMAC-SHA256 of the card number under a server key.
//! It lets repeat use of a card be recognised without keeping the number.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

use pawgo_core::card::ValidatedCard;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
#[error("invalid card fingerprint key: {0}")]
pub struct FingerprintKeyError(String);

/// Keyed card fingerprinter.
#[derive(Clone)]
pub struct CardFingerprinter {
    mac: HmacSha256,
}

impl std::fmt::Debug for CardFingerprinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardFingerprinter").finish_non_exhaustive()
    }
}

impl CardFingerprinter {
    /// # Errors
    ///
    /// Returns `FingerprintKeyError` if the key is rejected by HMAC.
    pub fn new(key: &SecretString) -> Result<Self, FingerprintKeyError> {
        let mac = HmacSha256::new_from_slice(key.expose_secret().as_bytes())
            .map_err(|e| FingerprintKeyError(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Hex-encoded fingerprint of the card number.
    #[must_use]
    pub fn fingerprint(&self, card: &ValidatedCard) -> String {
        let mut mac = self.mac.clone();
        mac.update(card.fingerprint_input());
        hex::encode(mac.finalize().into_bytes())
    }
}
