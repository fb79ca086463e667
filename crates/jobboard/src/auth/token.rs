//! Signed, time-limited bearer tokens (HS256 JWT).
//!
//! Verification is stateless: nothing is stored server-side, so a token stays
//! valid until its `exp` passes.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use tracing::warn;

use super::{AuthConfig, AuthError, Claims, ConfigValidationError, Role};

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<Keys>,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
            ttl_secs,
        }
    }

    /// Build from validated auth config, resolving `env:` secrets.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        let secret = config
            .resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)?;
        Ok(Self::new(secret.as_bytes(), config.token_ttl_secs()?))
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token for `user_id` with `role`, expiring after the configured TTL.
    pub fn issue(&self, user_id: &str, role: Role) -> Result<String, AuthError> {
        self.issue_at(user_id, role, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `issued_at`.
    pub fn issue_at(&self, user_id: &str, role: Role, issued_at: i64) -> Result<String, AuthError> {
        let exp = issued_at
            .checked_add(self.ttl_secs)
            .ok_or_else(|| AuthError::Internal("token expiry out of range".to_string()))?;
        let claims = Claims {
            user_id: user_id.to_string(),
            role,
            iat: issued_at,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Verify signature and expiry, returning the trusted claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.keys.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                kind => {
                    warn!("JWT validation failed: {:?}", kind);
                    AuthError::InvalidToken(format!("{:?}", kind))
                }
            }
        })?;

        Ok(data.claims)
    }
}
