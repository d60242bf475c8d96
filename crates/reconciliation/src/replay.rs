//! Chronological replay of movement records into location and attribution tables.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockrecon_core::{PurchaseOrderId, TransferId};
use stockrecon_movements::{Transfer, TransferKind, ValidLineItem};
use stockrecon_purchasing::PurchaseOrder;

use crate::location::{CanonicalLocation, ResolvedEndpoint, is_placeholder_supplier, resolve_endpoint};
use crate::supplier::SupplierBuckets;

/// Location → SKU → signed quantity.
pub type LocationTable = BTreeMap<CanonicalLocation, BTreeMap<String, i64>>;

/// Location → SKU → supplier buckets (only supplier warehouses are populated).
pub type AttributionTable = BTreeMap<CanonicalLocation, BTreeMap<String, SupplierBuckets>>;

/// Latest display metadata seen for a SKU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuInfo {
    pub name: String,
    pub unit: Option<String>,
}

/// One replayed transfer line. The ledger keeps every entry regardless of
/// the resulting balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub transfer_id: TransferId,
    pub created_at: DateTime<Utc>,
    pub kind: TransferKind,
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub unit: Option<String>,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub purchase_order_id: Option<PurchaseOrderId>,
    pub po_number: Option<String>,
    pub supplier: Option<String>,
}

/// Counters describing one replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayStats {
    pub transfers_replayed: usize,
    pub line_items_replayed: usize,
    /// Transfer lines skipped for missing SKU or quantity.
    pub skipped_line_items: usize,
}

/// Everything a replay produces. Pure output; nothing is written back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub locations: LocationTable,
    pub attributions: AttributionTable,
    pub catalog: BTreeMap<String, SkuInfo>,
    pub ledger: Vec<LedgerEntry>,
    pub stats: ReplayStats,
}

/// Resolved endpoints plus ledger metadata shared by every line of a transfer.
struct TransferContext<'a> {
    from: Option<ResolvedEndpoint>,
    to: Option<ResolvedEndpoint>,
    order: Option<&'a PurchaseOrder>,
    supplier: Option<String>,
}

/// Mutable replay state; private to one reconciliation.
#[derive(Debug, Default)]
struct MovementReplay {
    out: ReplayOutcome,
}

impl MovementReplay {
    fn context<'a>(
        transfer: &Transfer,
        orders: &HashMap<PurchaseOrderId, &'a PurchaseOrder>,
    ) -> TransferContext<'a> {
        let order = transfer
            .purchase_order_id
            .and_then(|id| orders.get(&id).copied());
        let authoritative = order
            .and_then(|o| o.supplier_name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty() && !is_placeholder_supplier(n));

        let from_label = transfer.from_label();
        let to_label = transfer.to_label();

        let from = match transfer.kind {
            TransferKind::In => None,
            TransferKind::Move | TransferKind::Out => {
                Some(resolve_endpoint(from_label, to_label, authoritative))
            }
        };
        let to = match transfer.kind {
            TransferKind::Out => None,
            TransferKind::In | TransferKind::Move => {
                Some(resolve_endpoint(to_label, from_label, authoritative))
            }
        };

        let supplier = to
            .as_ref()
            .and_then(|e| e.supplier.clone())
            .or_else(|| from.as_ref().and_then(|e| e.supplier.clone()))
            .or_else(|| authoritative.map(str::to_string));

        TransferContext {
            from,
            to,
            order,
            supplier,
        }
    }

    fn quantity_mut(&mut self, location: &CanonicalLocation, sku: &str) -> &mut i64 {
        self.out
            .locations
            .entry(location.clone())
            .or_default()
            .entry(sku.to_string())
            .or_insert(0)
    }

    fn buckets_mut(&mut self, location: &CanonicalLocation, sku: &str) -> &mut SupplierBuckets {
        self.out
            .attributions
            .entry(location.clone())
            .or_default()
            .entry(sku.to_string())
            .or_default()
    }

    fn credit(&mut self, endpoint: &ResolvedEndpoint, sku: &str, quantity: i64) {
        let held = self.quantity_mut(&endpoint.location, sku);
        *held = held.saturating_add(quantity);
        if !endpoint.location.is_supplier_warehouse() {
            return;
        }
        if let Some(supplier) = endpoint.supplier.as_deref() {
            self.buckets_mut(&endpoint.location, sku).add(supplier, quantity);
        }
    }

    fn debit(&mut self, endpoint: &ResolvedEndpoint, sku: &str, quantity: i64) {
        let held = self.quantity_mut(&endpoint.location, sku);
        *held = held.saturating_sub(quantity);
        if !endpoint.location.is_supplier_warehouse() {
            return;
        }
        if let Some(supplier) = endpoint.supplier.as_deref() {
            self.buckets_mut(&endpoint.location, sku).remove(supplier, quantity);
        }
    }

    fn apply_line(&mut self, transfer: &Transfer, ctx: &TransferContext<'_>, line: ValidLineItem<'_>) {
        let sku = line.sku;
        let quantity = line.quantity;

        match (transfer.kind, ctx.from.as_ref(), ctx.to.as_ref()) {
            (TransferKind::In, _, Some(to)) => self.credit(to, sku, quantity),
            (TransferKind::Move, Some(from), Some(to)) => {
                self.debit(from, sku, quantity);
                self.credit(to, sku, quantity);
            }
            // Leaves the tracked universe: no destination, attribution untouched.
            (TransferKind::Out, Some(from), _) => {
                let held = self.quantity_mut(&from.location, sku);
                *held = held.saturating_sub(quantity);
            }
            _ => {}
        }

        // Lines without a name or unit keep what earlier lines said.
        let info = self
            .out
            .catalog
            .entry(sku.to_string())
            .or_insert_with(|| SkuInfo {
                name: sku.to_string(),
                unit: None,
            });
        if line.name != sku {
            info.name = line.name.to_string();
        }
        if let Some(unit) = line.unit {
            info.unit = Some(unit.to_string());
        }

        self.out.ledger.push(LedgerEntry {
            transfer_id: transfer.id,
            created_at: transfer.created_at,
            kind: transfer.kind,
            sku: sku.to_string(),
            name: line.name.to_string(),
            quantity,
            unit: line.unit.map(str::to_string),
            from_location: transfer.from_location.clone(),
            to_location: transfer.to_location.clone(),
            purchase_order_id: transfer.purchase_order_id,
            po_number: ctx.order.map(|o| o.po_number.clone()),
            supplier: ctx.supplier.clone(),
        });
        self.out.stats.line_items_replayed += 1;
    }

    fn apply(&mut self, transfer: &Transfer, orders: &HashMap<PurchaseOrderId, &PurchaseOrder>) {
        let ctx = Self::context(transfer, orders);

        for line in &transfer.lines {
            match line.validate() {
                Ok(valid) => self.apply_line(transfer, &ctx, valid),
                Err(issue) => {
                    self.out.stats.skipped_line_items += 1;
                    tracing::warn!(
                        transfer_id = %transfer.id,
                        kind = %transfer.kind,
                        reason = %issue,
                        "skipping malformed transfer line"
                    );
                }
            }
        }

        self.out.stats.transfers_replayed += 1;
    }
}

/// Replay every transfer in creation order (stable for equal timestamps).
///
/// `orders` is only used to look up purchase-order numbers and authoritative
/// supplier names for transfers that reference an order.
pub fn replay(transfers: &[Transfer], orders: &[PurchaseOrder]) -> ReplayOutcome {
    let index: HashMap<PurchaseOrderId, &PurchaseOrder> =
        orders.iter().map(|o| (o.id, o)).collect();

    let mut ordered: Vec<&Transfer> = transfers.iter().collect();
    ordered.sort_by_key(|t| t.created_at);

    let mut state = MovementReplay::default();
    for transfer in ordered {
        state.apply(transfer, &index);
    }
    state.out
}
