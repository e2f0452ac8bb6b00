//! Helpers shared by the user-facing handlers.

use axum::http::StatusCode;
use axum::response::Response;

use nickbase_core::{Nickname, User, UserChanges};

use crate::app::errors;
use crate::app::services::AppServices;

/// Installed as the method fallback on every route: a verb the route does
/// not serve is a client error, not a 405.
pub async fn bad_verb() -> Response {
    errors::json_error(
        StatusCode::BAD_REQUEST,
        "method_not_allowed",
        "method not supported on this path",
    )
}

/// Resolve a user by a raw key. A key that cannot be a nickname cannot exist,
/// so it gets the same `not_found` status as an unknown one.
pub async fn lookup(services: &AppServices, raw: &str, not_found: StatusCode) -> Result<User, Response> {
    let Ok(nickname) = Nickname::parse(raw) else {
        return Err(errors::json_error(not_found, "not_found", "user not found"));
    };
    tracing::debug!(%nickname, "looking up user");
    services
        .store
        .get(&nickname)
        .await
        .map_err(|e| errors::store_error_to_response(e, not_found))
}

/// Hash a submitted password off the async executor.
pub async fn hash_password(password: Option<String>) -> Result<Option<String>, Response> {
    let Some(password) = password else {
        return Ok(None);
    };
    match tokio::task::spawn_blocking(move || nickbase_auth::hash_password(&password)).await {
        Ok(Ok(hash)) => Ok(Some(hash)),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "password hashing failed");
            Err(internal_error())
        }
        Err(e) => {
            tracing::error!(error = %e, "password hashing task failed");
            Err(internal_error())
        }
    }
}

/// Apply validated changes to `user` and persist it.
pub async fn save_changes(services: &AppServices, user: &mut User, changes: UserChanges) -> Result<(), Response> {
    let password_hash = hash_password(changes.password.clone()).await?;
    user.apply(changes, password_hash);
    services
        .store
        .update(user.clone())
        .await
        .map_err(|e| errors::store_error_to_response(e, StatusCode::NOT_FOUND))?;
    tracing::info!(nickname = %user.user_nickname, "user updated");
    Ok(())
}

fn internal_error() -> Response {
    errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
}
