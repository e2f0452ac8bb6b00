//! `nickbase-core` — the user entity and its serializer.
//!
//! This crate contains **pure domain** code (no storage, HTTP or crypto).

pub mod error;
pub mod nickname;
pub mod serializer;
pub mod user;

pub use error::{FieldError, NON_FIELD_ERRORS, ValidationErrors};
pub use nickname::{Nickname, NicknameError};
pub use serializer::{validate_create, validate_update};
pub use user::{NewUser, User, UserChanges};
