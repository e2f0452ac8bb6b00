//! User storage abstraction and its backends.

use std::sync::Arc;

use thiserror::Error;

use nickbase_core::{Nickname, User};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

/// Storage failures, kept distinct so callers never confuse "absent" with "broken".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error("user '{0}' already exists")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for the single `users` table, keyed by nickname.
///
/// Each call is independent; there is no transaction spanning a read and a
/// following write.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Every stored user, order unspecified.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn get(&self, nickname: &Nickname) -> Result<User, StoreError>;

    /// Insert a new user; `Conflict` if the nickname is taken.
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    /// Overwrite an existing user; `NotFound` if it vanished.
    async fn update(&self, user: User) -> Result<(), StoreError>;

    async fn delete(&self, nickname: &Nickname) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        (**self).list().await
    }

    async fn get(&self, nickname: &Nickname) -> Result<User, StoreError> {
        (**self).get(nickname).await
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        (**self).insert(user).await
    }

    async fn update(&self, user: User) -> Result<(), StoreError> {
        (**self).update(user).await
    }

    async fn delete(&self, nickname: &Nickname) -> Result<(), StoreError> {
        (**self).delete(nickname).await
    }
}
