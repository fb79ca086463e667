//! Authentication configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder shipped in old sample configs; never accepted as a real secret.
const INSECURE_PLACEHOLDER_SECRET: &str = "change-me-in-production";

const MIN_SECRET_LEN: usize = 32;

const DEFAULT_BCRYPT_COST: u32 = 10;
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Supports `env:VAR_NAME` indirection.
    pub jwt_secret: Option<String>,

    /// Token time-to-live as a duration string ("30m", "24h", "7d").
    pub token_ttl: String,

    /// bcrypt work factor.
    pub bcrypt_cost: u32,

    /// Allowed CORS origins for the single-page client.
    pub allowed_origins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl: "24h".to_string(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME` syntax.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        let Some(value) = &self.jwt_secret else {
            return Ok(None);
        };

        match value.strip_prefix("env:") {
            Some(var_name) => match std::env::var(var_name) {
                Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
            },
            None => Ok(Some(value.clone())),
        }
    }

    /// Token lifetime in seconds.
    pub fn token_ttl_secs(&self) -> Result<i64, ConfigValidationError> {
        let secs = parse_duration(&self.token_ttl)
            .map_err(|e| ConfigValidationError::InvalidTokenTtl(e.to_string()))?;
        if secs <= 0 {
            return Err(ConfigValidationError::InvalidTokenTtl(format!(
                "'{}' must be greater than zero",
                self.token_ttl
            )));
        }
        Ok(secs)
    }

    /// Validate the configuration. The server refuses to start on error.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let secret = self
            .resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)?;

        if secret == INSECURE_PLACEHOLDER_SECRET {
            return Err(ConfigValidationError::InsecureJwtSecret);
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigValidationError::JwtSecretTooShort);
        }

        self.token_ttl_secs()?;

        if !BCRYPT_COST_RANGE.contains(&self.bcrypt_cost) {
            return Err(ConfigValidationError::InvalidBcryptCost(self.bcrypt_cost));
        }

        Ok(())
    }

    /// Generate a random 64-character alphanumeric secret.
    ///
    /// `rand::rng()` is backed by the operating system CSPRNG.
    pub fn generate_jwt_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error(
        "JWT secret is required. Set auth.jwt_secret in config or JOBBOARD__AUTH__JWT_SECRET."
    )]
    MissingJwtSecret,

    #[error("JWT secret cannot be the placeholder value. Please configure a real secret.")]
    InsecureJwtSecret,

    #[error("JWT secret must be at least 32 characters long.")]
    JwtSecretTooShort,

    #[error("Environment variable '{0}' not found (referenced via env:{0} in config).")]
    EnvVarNotFound(String),

    #[error("Environment variable '{0}' is empty (referenced via env:{0} in config).")]
    EnvVarEmpty(String),

    #[error("Invalid auth.token_ttl: {0}")]
    InvalidTokenTtl(String),

    #[error("auth.bcrypt_cost must be between 4 and 31, got {0}")]
    InvalidBcryptCost(u32),
}

/// Parse a duration string like "7d", "24h", "30m" into seconds.
pub fn parse_duration(s: &str) -> anyhow::Result<i64> {
    let s = s.trim();
    let Some((unit_start, _)) = s.char_indices().last() else {
        anyhow::bail!("empty duration string");
    };

    let (num_str, unit) = s.split_at(unit_start);
    let num: i64 = num_str
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid duration number in '{}'", s))?;

    let multiplier: i64 = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        "w" => 604800,
        _ => anyhow::bail!("invalid duration unit '{}', use s/m/h/d/w", unit),
    };

    num.checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("duration '{}' is out of range", s))
}
