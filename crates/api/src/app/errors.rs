use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockrecon_infra::ReconcileError;

pub fn reconcile_error_to_response(err: ReconcileError) -> axum::response::Response {
    match err {
        ReconcileError::Upstream { .. } => {
            json_error(StatusCode::BAD_GATEWAY, "upstream_unavailable", err.to_string())
        }
        ReconcileError::InvalidQuery(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_query", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
