//! Procurement residuals: ordered quantity not yet moved out of production.

use std::collections::{BTreeMap, HashMap};

use stockrecon_core::PurchaseOrderId;
use stockrecon_movements::{Transfer, TransferKind};
use stockrecon_purchasing::{EligibilityPolicy, PurchaseOrder};

/// Production quantities per SKU derived from eligible purchase orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidualOutcome {
    /// SKU → residual still in production (only positive residuals).
    pub by_sku: BTreeMap<String, i64>,
    /// Eligible purchase-order lines skipped for missing SKU or quantity.
    pub skipped_order_lines: usize,
}

/// Cumulative received quantity keyed by (purchase order, SKU).
///
/// Only `in` transfers that reference a purchase order count as receipts.
pub fn received_quantities(transfers: &[Transfer]) -> HashMap<(PurchaseOrderId, String), i64> {
    let mut received: HashMap<(PurchaseOrderId, String), i64> = HashMap::new();

    for transfer in transfers {
        if transfer.kind != TransferKind::In {
            continue;
        }
        let Some(order_id) = transfer.purchase_order_id else {
            continue;
        };
        for line in &transfer.lines {
            // Malformed transfer lines are counted by replay, not here.
            if let Ok(valid) = line.validate() {
                let got = received.entry((order_id, valid.sku.to_string())).or_insert(0);
                *got = got.saturating_add(valid.quantity);
            }
        }
    }

    received
}

/// Compute per-SKU production residuals.
///
/// Ordered quantity is summed per (order, SKU) before subtracting receipts, so
/// an order listing one SKU on several lines is not charged twice. Residuals
/// at or below zero (fully or over-received) contribute nothing.
pub fn production_residuals(
    orders: &[PurchaseOrder],
    transfers: &[Transfer],
    policy: &EligibilityPolicy,
) -> ResidualOutcome {
    let received = received_quantities(transfers);
    let mut outcome = ResidualOutcome::default();

    for order in orders.iter().filter(|o| policy.is_eligible(o.status)) {
        let mut ordered: BTreeMap<&str, i64> = BTreeMap::new();
        for line in &order.lines {
            match line.sku_and_quantity() {
                Some((sku, quantity)) => {
                    let total = ordered.entry(sku).or_insert(0);
                    *total = total.saturating_add(quantity);
                }
                None => {
                    outcome.skipped_order_lines += 1;
                    tracing::warn!(
                        order_id = %order.id,
                        po_number = %order.po_number,
                        "skipping purchase order line without sku or quantity"
                    );
                }
            }
        }

        for (sku, quantity) in ordered {
            let got = received
                .get(&(order.id, sku.to_string()))
                .copied()
                .unwrap_or(0);
            let residual = quantity.saturating_sub(got);
            if residual > 0 {
                let held = outcome.by_sku.entry(sku.to_string()).or_insert(0);
                *held = held.saturating_add(residual);
            }
        }
    }

    outcome
}
