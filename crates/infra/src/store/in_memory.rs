use std::collections::HashMap;
use std::sync::RwLock;

use nickbase_core::{Nickname, User};

use super::{StoreError, UserStore};

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<Nickname, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E>(_: E) -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.values().cloned().collect())
    }

    async fn get(&self, nickname: &Nickname) -> Result<User, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        map.get(nickname).cloned().ok_or(StoreError::NotFound)
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map.contains_key(user.nickname()) {
            return Err(StoreError::Conflict(user.user_nickname.to_string()));
        }
        map.insert(user.user_nickname.clone(), user);
        Ok(())
    }

    async fn update(&self, user: User) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        match map.get_mut(user.nickname()) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, nickname: &Nickname) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        map.remove(nickname).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
