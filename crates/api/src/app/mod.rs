//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store + token issuer shared by handlers
//! - `routes/`: HTTP routes + handlers (one file per path family)
//! - `dto.rs`: request DTOs and body parsing helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: AppServices) -> Router {
    routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::log_requests))
            .layer(Extension(Arc::new(services))),
    )
}
