use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use nickbase_auth::TokenError;
use nickbase_core::ValidationErrors;
use nickbase_infra::StoreError;

/// Map a storage failure. `not_found` is the status the caller wants for a
/// missing key (404 for lookups, 400 for the delete path).
pub fn store_error_to_response(err: StoreError, not_found: StatusCode) -> Response {
    match err {
        StoreError::NotFound => json_error(not_found, "not_found", "user not found"),
        StoreError::Conflict(nick) => validation_error_response(ValidationErrors::single(
            "user_nickname",
            format!("user with this user nickname already exists: '{nick}'"),
        )),
        StoreError::Unavailable(msg) => {
            tracing::warn!(error = %msg, "user store unavailable");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "storage_unavailable",
                "user storage is unavailable",
            )
        }
    }
}

pub fn validation_error_response(errors: ValidationErrors) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": errors.to_string(),
            "fields": errors,
        })),
    )
        .into_response()
}

/// 401 for anything wrong with a presented token; 500 if we failed to sign one.
pub fn token_error_to_response(err: TokenError) -> Response {
    match err {
        TokenError::Encode(msg) => {
            tracing::error!(error = %msg, "token signing failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", "could not issue token")
        }
        other => {
            tracing::debug!(error = %other, "rejected token");
            (
                StatusCode::UNAUTHORIZED,
                axum::Json(json!({
                    "detail": "Token is invalid or expired",
                    "code": "token_not_valid",
                })),
            )
                .into_response()
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
