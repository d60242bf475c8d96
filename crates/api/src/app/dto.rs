use serde::Deserialize;

use stockrecon_infra::ReconcileError;
use stockrecon_reconciliation::{PositionQuery, SupplierTieBreak};

// -------------------------
// Request DTOs
// -------------------------

/// Query string for `GET /positions`.
///
/// Numeric and enum values arrive as raw strings so bad input maps to the
/// JSON `invalid_query` error instead of a bare extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsParams {
    pub sku: Option<String>,
    pub location: Option<String>,
    pub supplier_tie_break: Option<String>,
    pub ledger_limit: Option<String>,
}

impl PositionsParams {
    pub fn tie_break(&self) -> Result<SupplierTieBreak, ReconcileError> {
        match self.supplier_tie_break.as_deref().map(str::trim) {
            None | Some("") => Ok(SupplierTieBreak::default()),
            Some(raw) => raw
                .parse()
                .map_err(|e: stockrecon_core::DomainError| ReconcileError::InvalidQuery(e.to_string())),
        }
    }

    pub fn to_query(&self, default_ledger_limit: usize) -> Result<PositionQuery, ReconcileError> {
        let ledger_limit = match self.ledger_limit.as_deref().map(str::trim) {
            None | Some("") => default_ledger_limit,
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                ReconcileError::InvalidQuery(format!(
                    "ledgerLimit must be a non-negative integer, got '{raw}'"
                ))
            })?,
        };

        Ok(PositionQuery::new(self.sku.as_deref(), self.location.as_deref())
            .with_ledger_limit(ledger_limit))
    }
}
