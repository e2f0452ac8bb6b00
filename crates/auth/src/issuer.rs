//! HS256 token issuance and verification.
//!
//! A login yields an access/refresh pair. Both carry the user's nickname
//! (`user_id`) and display name (`name`); refreshing copies them into a new
//! access token without consulting storage. There is no revocation and the
//! refresh token is not rotated.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::claims::{TokenClaims, TokenType, TokenValidationError, validate_claims};

/// Lifetimes of the two token kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(5),
            refresh: Duration::days(1),
        }
    }
}

/// Identity a token pair is minted for.
#[derive(Debug, Copy, Clone)]
pub struct TokenSubject<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is invalid: {0}")]
    Invalid(String),

    #[error(transparent)]
    Window(#[from] TokenValidationError),

    #[error("expected a {expected} token, got {actual}")]
    WrongType { expected: TokenType, actual: TokenType },

    #[error("failed to encode token: {0}")]
    Encode(String),
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetimes: TokenLifetimes,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], lifetimes: TokenLifetimes) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit `now` in `validate_claims`.
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// Mint a fresh access/refresh pair.
    pub fn issue_pair(&self, subject: TokenSubject<'_>, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        let refresh = self.mint(TokenType::Refresh, subject.user_id, subject.name, now)?;
        let access = self.mint(TokenType::Access, subject.user_id, subject.name, now)?;
        tracing::debug!(user_id = subject.user_id, "issued token pair");
        Ok(TokenPair { access, refresh })
    }

    /// Exchange a valid refresh token for a new access token.
    pub fn refresh(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = self.decode(refresh_token, TokenType::Refresh, now)?;
        self.mint(TokenType::Access, &claims.user_id, &claims.name, now)
    }

    /// Verify signature, type and time window of a token.
    pub fn decode(&self, token: &str, expected: TokenType, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        let claims = data.claims;

        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected,
                actual: claims.token_type,
            });
        }
        validate_claims(&claims, now)?;
        Ok(claims)
    }

    fn mint(&self, token_type: TokenType, user_id: &str, name: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let ttl = match token_type {
            TokenType::Access => self.lifetimes.access,
            TokenType::Refresh => self.lifetimes.refresh,
        };
        let claims = TokenClaims {
            token_type,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::now_v7(),
            user_id: user_id.to_string(),
            name: name.to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}
