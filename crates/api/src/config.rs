//! Process configuration, read from environment variables.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use nickbase_auth::TokenLifetimes;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub token_lifetimes: TokenLifetimes,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr.parse().map_err(|_| ConfigError::Invalid {
            var: "BIND_ADDR",
            expected: "socket address",
            value: raw_addr.clone(),
        })?;

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            });

        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());

        let defaults = TokenLifetimes::default();
        let token_lifetimes = TokenLifetimes {
            access: seconds(&lookup, "ACCESS_TOKEN_LIFETIME_SECS")?.unwrap_or(defaults.access),
            refresh: seconds(&lookup, "REFRESH_TOKEN_LIFETIME_SECS")?.unwrap_or(defaults.refresh),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url,
            token_lifetimes,
        })
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    match raw.trim().parse::<i64>().ok().filter(|secs| *secs > 0).and_then(Duration::try_seconds) {
        Some(ttl) => Ok(Some(ttl)),
        None => Err(ConfigError::Invalid {
            var,
            expected: "positive number of seconds",
            value: raw,
        }),
    }
}
