//! Service wiring shared by every handler.

use std::sync::Arc;

use nickbase_auth::{TokenIssuer, TokenLifetimes};
use nickbase_infra::{InMemoryUserStore, PostgresUserStore, UserStore};

use crate::config::Settings;

#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn UserStore>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppServices {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
        }
    }

    /// In-memory store + default token lifetimes (tests/dev).
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::new(
            Arc::new(InMemoryUserStore::new()),
            TokenIssuer::new(jwt_secret.as_bytes(), TokenLifetimes::default()),
        )
    }

    /// Postgres when `DATABASE_URL` is configured, otherwise in-memory.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn UserStore> = match &settings.database_url {
            Some(url) => {
                tracing::info!("using postgres user store");
                Arc::new(PostgresUserStore::connect(url).await?)
            }
            None => {
                tracing::warn!("DATABASE_URL not set; users are kept in memory only");
                Arc::new(InMemoryUserStore::new())
            }
        };
        let tokens = TokenIssuer::new(settings.jwt_secret.as_bytes(), settings.token_lifetimes);
        Ok(Self::new(store, tokens))
    }
}
