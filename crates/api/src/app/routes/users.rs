//! `GET /` and `GET|PUT /user/{nick}`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use nickbase_core::validate_update;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Every user as a JSON array.
pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.store.list().await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => errors::store_error_to_response(e, StatusCode::NOT_FOUND),
    }
}

pub async fn get_by_nick(
    Extension(services): Extension<Arc<AppServices>>,
    Path(nick): Path<String>,
) -> Response {
    match common::lookup(&services, &nick, StatusCode::NOT_FOUND).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(resp) => resp,
    }
}

/// Partial update by path key. Responds 202 with an empty body.
pub async fn put_by_nick(
    Extension(services): Extension<Arc<AppServices>>,
    Path(nick): Path<String>,
    body: Bytes,
) -> Response {
    let mut user = match common::lookup(&services, &nick, StatusCode::NOT_FOUND).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    let changes = match dto::parse_body(&body).and_then(|payload| validate_update(&user, &payload)) {
        Ok(c) => c,
        Err(e) => return errors::validation_error_response(e),
    };

    match common::save_changes(&services, &mut user, changes).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(resp) => resp,
    }
}
