//! `nickbase-auth` — token issuance and password hashing.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod issuer;
pub mod password;

pub use claims::{TokenClaims, TokenType, TokenValidationError, validate_claims};
pub use issuer::{TokenError, TokenIssuer, TokenLifetimes, TokenPair, TokenSubject};
pub use password::{PasswordError, hash_password, verify_password};
