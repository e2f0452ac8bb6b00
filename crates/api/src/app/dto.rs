use axum::body::Bytes;
use serde::Deserialize;
use serde_json::Value;

use nickbase_core::{NON_FIELD_ERRORS, Nickname, ValidationErrors};

// -------------------------
// Request DTOs
// -------------------------

/// `/data/?user=<nick>`
#[derive(Debug, Deserialize)]
pub struct DataQuery {
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenObtainRequest {
    pub user_nickname: String,
    pub password: String,
}

// -------------------------
// Parsing helpers
// -------------------------

/// Parse a raw request body as JSON. An empty body is `null`.
///
/// Bodies are read as bytes so that a missing or wrong `Content-Type`, or a
/// syntax error, surfaces as a 400 instead of axum's 415/422 rejections.
pub fn parse_body(body: &Bytes) -> Result<Value, ValidationErrors> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| ValidationErrors::single(NON_FIELD_ERRORS, format!("JSON parse error: {e}")))
}

/// The raw `user_nickname` key carried inside a request body, unparsed.
pub fn body_key(body: &Value) -> Result<&str, ValidationErrors> {
    required_str(body, "user_nickname")
}

/// The `user_nickname` key carried inside a request body.
pub fn body_nickname(body: &Value) -> Result<Nickname, ValidationErrors> {
    let raw = body_key(body)?;
    Nickname::parse(raw).map_err(|e| ValidationErrors::single("user_nickname", e.to_string()))
}

pub fn parse_token_obtain(body: &Value) -> Result<TokenObtainRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let user_nickname = collect(required_str(body, "user_nickname"), &mut errors);
    let password = collect(required_str(body, "password"), &mut errors);

    match (user_nickname, password) {
        (Some(user_nickname), Some(password)) => Ok(TokenObtainRequest {
            user_nickname: user_nickname.to_string(),
            password: password.to_string(),
        }),
        _ => Err(errors),
    }
}

pub fn parse_token_refresh(body: &Value) -> Result<String, ValidationErrors> {
    required_str(body, "refresh").map(str::to_string)
}

fn required_str<'a>(body: &'a Value, field: &'static str) -> Result<&'a str, ValidationErrors> {
    match body.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        Some(Value::String(_)) => Err(ValidationErrors::single(field, "This field may not be blank.")),
        Some(Value::Null) | None => Err(ValidationErrors::single(field, "This field is required.")),
        Some(_) => Err(ValidationErrors::single(field, "Not a valid string.")),
    }
}

fn collect<T>(result: Result<T, ValidationErrors>, errors: &mut ValidationErrors) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            for fe in e.errors() {
                errors.push(fe.field.clone(), fe.message.clone());
            }
            None
        }
    }
}
