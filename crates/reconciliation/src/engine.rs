//! Full reconciliation pass: residuals, replay, then aggregation.

use stockrecon_movements::Transfer;
use stockrecon_purchasing::{EligibilityPolicy, PurchaseOrder};

use crate::aggregate::{Reconciliation, aggregate};
use crate::replay::replay;
use crate::residual::production_residuals;
use crate::supplier::SupplierTieBreak;

/// Knobs for one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub eligibility: EligibilityPolicy,
    pub tie_break: SupplierTieBreak,
}

impl ReconcileOptions {
    pub fn with_tie_break(mut self, tie_break: SupplierTieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_eligibility(mut self, eligibility: EligibilityPolicy) -> Self {
        self.eligibility = eligibility;
        self
    }
}

/// Reconcile one owner's purchase orders and transfers into positions.
///
/// Pure and deterministic: the same inputs always produce the same output,
/// regardless of the order `transfers` arrive in.
pub fn reconcile(
    orders: &[PurchaseOrder],
    transfers: &[Transfer],
    options: &ReconcileOptions,
) -> Reconciliation {
    let residuals = production_residuals(orders, transfers, &options.eligibility);
    let replayed = replay(transfers, orders);
    let reconciliation = aggregate(residuals, replayed, options.tie_break);

    tracing::debug!(
        orders = orders.len(),
        transfers = reconciliation.stats.transfers_replayed,
        line_items = reconciliation.stats.line_items_replayed,
        skipped = reconciliation.skipped_line_items(),
        locations = reconciliation.by_location.len(),
        skus = reconciliation.by_sku.len(),
        "reconciliation complete"
    );

    reconciliation
}
