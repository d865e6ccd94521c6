//! Invite-link configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

/// Configuration for issued invite links.
#[derive(Clone, Debug)]
pub struct InviteConfig {
    /// Base URL the raw token is appended to when a join URL is returned,
    /// e.g. `https://app.crewdeck.io/join`.
    pub join_url_base: String,
    /// Default link lifetime in days. `None` means links never expire unless
    /// the caller supplies an explicit expiry.
    pub default_expires_days: Option<i64>,
}

impl InviteConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let join_url_base = std::env::var("CREWDECK_JOIN_URL_BASE")
            .map_err(|_| ConfigError::MissingEnvVar("CREWDECK_JOIN_URL_BASE".to_string()))?;

        let default_expires_days = match std::env::var("CREWDECK_INVITE_EXPIRES_DAYS") {
            Ok(raw) => Some(raw.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                var: "CREWDECK_INVITE_EXPIRES_DAYS".to_string(),
                value: raw,
            })?),
            Err(_) => None,
        };

        Ok(Self {
            join_url_base,
            default_expires_days,
        })
    }

    /// Configuration for tests: local base URL, seven-day links.
    pub fn test() -> Self {
        Self {
            join_url_base: "http://localhost:3000/join".to_string(),
            default_expires_days: Some(7),
        }
    }
}
