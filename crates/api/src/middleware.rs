use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use stockrecon_core::OwnerId;

use crate::app::errors::json_error;
use crate::context::OwnerContext;

/// Header carrying the owner whose positions are requested.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Resolve the owner context from `x-owner-id` and attach it to the request.
pub async fn owner_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let owner_id = extract_owner(req.headers())?;
    req.extensions_mut().insert(OwnerContext::new(owner_id));
    Ok(next.run(req).await)
}

fn extract_owner(headers: &HeaderMap) -> Result<OwnerId, Response> {
    let header = headers.get(OWNER_HEADER).ok_or_else(|| {
        json_error(
            StatusCode::UNAUTHORIZED,
            "missing_owner",
            format!("{OWNER_HEADER} header is required"),
        )
    })?;

    let raw = header
        .to_str()
        .map_err(|_| invalid_owner("header is not valid ASCII"))?
        .trim();
    if raw.is_empty() {
        return Err(json_error(
            StatusCode::UNAUTHORIZED,
            "missing_owner",
            format!("{OWNER_HEADER} header is empty"),
        ));
    }

    raw.parse::<OwnerId>()
        .map_err(|e| invalid_owner(e.to_string()))
}

fn invalid_owner(message: impl Into<String>) -> Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_owner", message)
}
