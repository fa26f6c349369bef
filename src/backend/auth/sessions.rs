/**
 * Session Tokens
 *
 * HS256 JWTs carrying `{ sub, email, iat, exp }`. The signing secret and the
 * lifetime come from `ServerConfig`; `TokenKeys` is built once at start-up and
 * cloned into the application state.
 */

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Signing and verification keys plus token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(lifetime_hours),
        }
    }

    /// Create a JWT token for a user, valid from now
    pub fn create_token(&self, user_id: i64, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.create_token_at(user_id, email, Utc::now())
    }

    /// Create a token as if it had been issued at `issued_at`
    pub fn create_token_at(
        &self,
        user_id: i64,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = issued_at.timestamp().max(0) as u64;
        let exp = (issued_at + self.lifetime).timestamp().max(0) as u64;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp,
            iat,
        };

        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify signature and expiry, returning the decoded claims
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(token_data.claims)
    }
}
