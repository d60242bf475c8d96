use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    response::IntoResponse,
};

use crate::app::dto::PositionsParams;
use crate::app::{errors, services::AppServices};
use crate::context::OwnerContext;

/// GET /positions?sku=&location=&supplierTieBreak=&ledgerLimit=
///
/// Full reconciliation for the calling owner. The aggregated views are
/// returned whole; the ledger is the most recent `ledgerLimit` entries.
pub async fn get_positions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    Query(params): Query<PositionsParams>,
) -> axum::response::Response {
    let tie_break = match params.tie_break() {
        Ok(t) => t,
        Err(e) => return errors::reconcile_error_to_response(e),
    };
    let query = match params.to_query(services.default_ledger_limit) {
        Ok(q) => q,
        Err(e) => return errors::reconcile_error_to_response(e),
    };

    match services
        .positions
        .get_positions(owner.owner_id(), &query, tie_break)
        .await
    {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
