//! The `User` entity and the validated inputs that create or change it.

use serde::Serialize;

use crate::Nickname;

/// A persisted user record.
///
/// Serializes to the wire shape: `password_hash` is never emitted and
/// `user_age` is omitted when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_nickname: Nickname,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_age: Option<i32>,
    #[serde(skip)]
    pub password_hash: Option<String>,
}

impl User {
    pub fn nickname(&self) -> &Nickname {
        &self.user_nickname
    }

    /// Whether this user can authenticate with a password at all.
    pub fn has_usable_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Apply validated changes. Fields absent from `changes` keep their value.
    ///
    /// `password_hash` must be the hash of `changes.password` when one was
    /// submitted; hashing is left to the caller.
    pub fn apply(&mut self, changes: UserChanges, password_hash: Option<String>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(age) = changes.user_age {
            self.user_age = age;
        }
        if password_hash.is_some() {
            self.password_hash = password_hash;
        }
    }
}

/// Validated payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub user_nickname: Nickname,
    pub name: String,
    pub user_age: Option<i32>,
    /// Plain-text password, still to be hashed.
    pub password: Option<String>,
}

impl NewUser {
    pub fn into_user(self, password_hash: Option<String>) -> User {
        User {
            user_nickname: self.user_nickname,
            name: self.name,
            user_age: self.user_age,
            password_hash,
        }
    }
}

/// Validated partial update.
///
/// `user_age` is doubly optional: `None` leaves it alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub user_age: Option<Option<i32>>,
    pub password: Option<String>,
}
