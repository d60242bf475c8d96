//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: upstream sources and the positions service
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: query-string DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    // Owner-scoped routes: require the owner header.
    let scoped = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn(middleware::owner_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(scoped)
        .layer(ServiceBuilder::new())
}
