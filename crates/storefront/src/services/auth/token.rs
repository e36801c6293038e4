//! Signed bearer tokens (HS256 JSON Web Tokens).

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bazaar_core::UserId;

use crate::config::AuthConfig;

/// Token failures.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token's `exp` is in the past.
    #[error("token expired")]
    Expired,

    /// Malformed token, bad signature, or unexpected claims.
    #[error("invalid token: {0}")]
    Invalid(String),

    /// Signing failed.
    #[error("token generation failed: {0}")]
    Generation(String),
}

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Issues and verifies auth tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::hours(config.token_ttl_hours),
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Generation` if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify a token and return the user id it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` or `TokenError::Invalid`.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::Invalid("subject is not a user id".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn service(secret: &str, ttl_hours: i64) -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: SecretString::from(secret),
            token_ttl_hours: ttl_hours,
        })
    }

    const SECRET: &str = "Kq7#vN2$pX9!mL4@wR8^tY1&zB6*cD3%";

    #[test]
    fn test_issue_then_verify() {
        let tokens = service(SECRET, 1);
        let token = tokens.issue(UserId::new(42)).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_rejects_token_signed_with_other_secret() {
        let token = service(SECRET, 1).issue(UserId::new(1)).unwrap();
        let other = service("Zz9&yY8^xX7%wW6$vV5#uU4@tT3!sS2*", 1);
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_expired_token() {
        let tokens = service(SECRET, -1);
        let token = tokens.issue(UserId::new(1)).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_rejects_garbage() {
        let tokens = service(SECRET, 1);
        assert!(matches!(
            tokens.verify("not.a.token"),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(tokens.verify(""), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_non_numeric_subject() {
        let tokens = service(SECRET, 1);
        let claims = Claims {
            sub: "admin".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &tokens.encoding_key).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid(_))));
    }
}
