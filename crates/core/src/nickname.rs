//! The user primary key.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on nickname length, in characters.
pub const NICKNAME_MAX_LEN: usize = 150;

/// Unique, immutable identifier of a user.
///
/// Letters, digits and `@ . + - _` only; 1..=150 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nickname(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NicknameError {
    #[error("This field may not be blank.")]
    Empty,

    #[error("Ensure this field has no more than {} characters.", NICKNAME_MAX_LEN)]
    TooLong,

    #[error("Enter a valid nickname: '{0}' is not allowed. Use letters, digits and @/./+/-/_ only.")]
    InvalidChar(char),
}

impl Nickname {
    pub fn parse(raw: &str) -> Result<Self, NicknameError> {
        if raw.is_empty() {
            return Err(NicknameError::Empty);
        }
        if raw.chars().count() > NICKNAME_MAX_LEN {
            return Err(NicknameError::TooLong);
        }
        if let Some(bad) = raw.chars().find(|c| !is_nickname_char(*c)) {
            return Err(NicknameError::InvalidChar(bad));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_nickname_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

impl core::fmt::Display for Nickname {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Nickname {
    type Err = NicknameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Nickname {
    type Error = NicknameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Nickname> for String {
    fn from(value: Nickname) -> Self {
        value.0
    }
}

impl AsRef<str> for Nickname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
