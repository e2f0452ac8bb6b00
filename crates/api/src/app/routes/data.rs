//! `/data/`: one path, four verbs. GET keys on the `user` query parameter;
//! PUT and DELETE key on `user_nickname` inside the body.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json,
};

use nickbase_core::{validate_create, validate_update};
use nickbase_infra::StoreError;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn methods() -> MethodRouter {
    get(get_user)
        .post(create_user)
        .put(update_user)
        .delete(delete_user)
        .fallback(common::bad_verb)
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::DataQuery>,
) -> Response {
    let Some(nick) = query.user.filter(|u| !u.is_empty()) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_parameter",
            "query parameter 'user' is required",
        );
    };

    match common::lookup(&services, &nick, StatusCode::NOT_FOUND).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn create_user(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> Response {
    let new_user = match dto::parse_body(&body).and_then(|payload| validate_create(&payload)) {
        Ok(u) => u,
        Err(e) => return errors::validation_error_response(e),
    };

    let password_hash = match common::hash_password(new_user.password.clone()).await {
        Ok(h) => h,
        Err(resp) => return resp,
    };
    let user = new_user.into_user(password_hash);

    match services.store.insert(user.clone()).await {
        Ok(()) => {
            tracing::info!(nickname = %user.user_nickname, "user created");
            (StatusCode::CREATED, Json(user)).into_response()
        }
        Err(e) => errors::store_error_to_response(e, StatusCode::NOT_FOUND),
    }
}

pub async fn update_user(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> Response {
    let payload = match dto::parse_body(&body) {
        Ok(v) => v,
        Err(e) => return errors::validation_error_response(e),
    };
    // Only presence is checked here; a key that is not a valid nickname is
    // simply an unknown user.
    let key = match dto::body_key(&payload) {
        Ok(k) => k,
        Err(e) => return errors::validation_error_response(e),
    };

    let mut user = match common::lookup(&services, key, StatusCode::NOT_FOUND).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    let changes = match validate_update(&user, &payload) {
        Ok(c) => c,
        Err(e) => return errors::validation_error_response(e),
    };

    match common::save_changes(&services, &mut user, changes).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(user)).into_response(),
        Err(resp) => resp,
    }
}

/// Every client-side failure (bad body, missing key, unknown user) is a
/// plain 400. Only an unreachable store is reported differently.
pub async fn delete_user(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> Response {
    let nickname = match dto::parse_body(&body).and_then(|payload| dto::body_nickname(&payload)) {
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(error = %e, "rejected delete");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match services.store.delete(&nickname).await {
        Ok(()) => {
            tracing::info!(%nickname, "user deleted");
            StatusCode::OK.into_response()
        }
        Err(StoreError::NotFound) => StatusCode::BAD_REQUEST.into_response(),
        Err(e) => errors::store_error_to_response(e, StatusCode::BAD_REQUEST),
    }
}
