use axum::{
    routing::{get, post},
    Router,
};

pub mod common;
pub mod data;
pub mod system;
pub mod token;
pub mod users;

/// The full routing table. Verbs a path does not serve answer 400.
pub fn router() -> Router {
    Router::new()
        .route("/", get(users::list_users).fallback(common::bad_verb))
        .route(
            "/user/:nick",
            get(users::get_by_nick)
                .put(users::put_by_nick)
                .fallback(common::bad_verb),
        )
        .route("/data/", data::methods())
        .route("/data", data::methods())
        .route("/token/", post(token::obtain_pair).fallback(common::bad_verb))
        .route("/token/refresh", post(token::refresh).fallback(common::bad_verb))
        .route("/health", get(system::health))
}
