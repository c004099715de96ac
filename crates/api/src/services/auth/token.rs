//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user id and role. There is no
//! revocation list, so a token stays valid until it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use pawgo_core::{UserId, UserRole};

use super::AuthError;
use crate::config::AuthConfig;
use crate::models::CurrentUser;

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string per RFC 7519.
    pub sub: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signing and verification keys derived from the configured secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenKeys {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::hours(config.token_ttl_hours),
        }
    }

    /// Sign a token for `user`, valid from now for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue(&self, user: CurrentUser) -> Result<IssuedToken, AuthError> {
        self.issue_at(user, Utc::now())
    }

    /// Sign a token as if issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue_at(&self, user: CurrentUser, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::TokenSigning)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and return the identity it carries.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a bad signature, an expired token
    /// or a malformed subject.
    pub fn verify(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AuthError::InvalidToken
            })?;

        let id = data
            .claims
            .sub
            .parse::<i32>()
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(CurrentUser {
            id: UserId::new(id),
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::new(&AuthConfig {
            jwt_secret: SecretString::from(secret.to_owned()),
            token_ttl_hours: 24,
        })
    }

    fn provider() -> CurrentUser {
        CurrentUser {
            id: UserId::new(42),
            role: UserRole::ServiceProvider,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys("k9Qw!vR3#pLm8@zX2$nB7^tY5&hJ4*eD");
        let issued = keys.issue(provider()).unwrap();

        assert_eq!(keys.verify(&issued.token).unwrap(), provider());
        assert!(issued.expires_at > Utc::now());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = keys("k9Qw!vR3#pLm8@zX2$nB7^tY5&hJ4*eD");
        let issued = keys
            .issue_at(provider(), Utc::now() - Duration::hours(25))
            .unwrap();

        assert!(matches!(keys.verify(&issued.token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let ours = keys("k9Qw!vR3#pLm8@zX2$nB7^tY5&hJ4*eD");
        let theirs = keys("Zr4%uN8!cW2@qF6#xH9$mK3^vS7&aL1*");
        let issued = theirs.issue(provider()).unwrap();

        assert!(matches!(ours.verify(&issued.token), Err(AuthError::InvalidToken)));
        assert!(matches!(ours.verify("not.a.jwt"), Err(AuthError::InvalidToken)));
    }
}
