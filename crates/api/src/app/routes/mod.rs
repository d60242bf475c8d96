use axum::{Router, routing::get};

pub mod positions;
pub mod system;

/// Router for all owner-scoped endpoints.
pub fn router() -> Router {
    Router::new().route("/positions", get(positions::get_positions))
}
