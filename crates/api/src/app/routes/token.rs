//! `POST /token/` and `POST /token/refresh`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use nickbase_auth::{TokenSubject, verify_password};
use nickbase_core::{Nickname, User};
use nickbase_infra::StoreError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Exchange nickname + password for an access/refresh pair.
pub async fn obtain_pair(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> Response {
    let request = match dto::parse_body(&body).and_then(|payload| dto::parse_token_obtain(&payload)) {
        Ok(r) => r,
        Err(e) => return errors::validation_error_response(e),
    };

    let user = match authenticate(&services, request).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    let subject = TokenSubject {
        user_id: user.user_nickname.as_str(),
        name: &user.name,
    };
    match services.tokens.issue_pair(subject, Utc::now()) {
        Ok(pair) => {
            tracing::info!(nickname = %user.user_nickname, "token issued");
            (StatusCode::OK, Json(pair)).into_response()
        }
        Err(e) => errors::token_error_to_response(e),
    }
}

/// Exchange a refresh token for a new access token.
pub async fn refresh(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> Response {
    let token = match dto::parse_body(&body).and_then(|payload| dto::parse_token_refresh(&payload)) {
        Ok(t) => t,
        Err(e) => return errors::validation_error_response(e),
    };

    match services.tokens.refresh(&token, Utc::now()) {
        Ok(access) => (StatusCode::OK, Json(json!({ "access": access }))).into_response(),
        Err(e) => errors::token_error_to_response(e),
    }
}

async fn authenticate(services: &AppServices, request: dto::TokenObtainRequest) -> Result<User, Response> {
    let Ok(nickname) = Nickname::parse(&request.user_nickname) else {
        return Err(no_active_account());
    };

    let user = match services.store.get(&nickname).await {
        Ok(u) => u,
        Err(StoreError::NotFound) => {
            tracing::warn!(%nickname, "token requested for unknown user");
            return Err(no_active_account());
        }
        Err(e) => return Err(errors::store_error_to_response(e, StatusCode::UNAUTHORIZED)),
    };

    let Some(hash) = user.password_hash.clone() else {
        tracing::warn!(%nickname, "token requested for user without a password");
        return Err(no_active_account());
    };

    let password = request.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await;
    match verified {
        Ok(Ok(true)) => Ok(user),
        Ok(Ok(false)) => {
            tracing::warn!(%nickname, "wrong password");
            Err(no_active_account())
        }
        Ok(Err(e)) => {
            tracing::warn!(%nickname, error = %e, "stored password hash unusable");
            Err(no_active_account())
        }
        Err(e) => {
            tracing::error!(error = %e, "password verification task failed");
            Err(errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            ))
        }
    }
}

fn no_active_account() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "No active account found with the given credentials" })),
    )
        .into_response()
}
