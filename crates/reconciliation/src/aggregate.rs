//! Folding residuals and replay output into by-location and by-SKU views.
//!
//! Both views drop zero quantities on their own, so a position that nets to
//! exactly zero disappears from both even if it existed mid-replay.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::location::CanonicalLocation;
use crate::replay::{AttributionTable, LedgerEntry, ReplayOutcome, ReplayStats, SkuInfo};
use crate::residual::ResidualOutcome;
use crate::supplier::{SupplierBuckets, SupplierShare, SupplierTieBreak};

/// One SKU held at one canonical location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPosition {
    pub sku: String,
    pub name: String,
    pub unit: Option<String>,
    pub quantity: i64,
    /// Primary attributed supplier (supplier warehouses only).
    pub supplier: Option<String>,
    pub suppliers: Vec<SupplierShare>,
}

/// All non-zero positions at one canonical location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView {
    pub location: CanonicalLocation,
    pub total: i64,
    pub positions: Vec<LocationPosition>,
}

impl LocationView {
    pub fn recompute_total(&mut self) {
        self.total = self.positions.iter().map(|p| p.quantity).sum();
    }
}

/// One SKU across every location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuPosition {
    pub sku: String,
    pub name: String,
    pub unit: Option<String>,
    pub total: i64,
    pub locations: BTreeMap<CanonicalLocation, i64>,
    pub primary_supplier: Option<String>,
    pub suppliers: Vec<SupplierShare>,
}

impl SkuPosition {
    pub fn recompute_total(&mut self) {
        self.total = self.locations.values().sum();
    }
}

/// Complete, unfiltered result of one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub by_location: Vec<LocationView>,
    pub by_sku: Vec<SkuPosition>,
    /// Full chronological ledger (oldest first).
    pub ledger: Vec<LedgerEntry>,
    pub stats: ReplayStats,
    /// Purchase-order lines skipped for missing SKU or quantity.
    pub skipped_order_lines: usize,
}

impl Reconciliation {
    pub fn skipped_line_items(&self) -> usize {
        self.stats.skipped_line_items + self.skipped_order_lines
    }
}

fn display(catalog: &BTreeMap<String, SkuInfo>, sku: &str) -> (String, Option<String>) {
    match catalog.get(sku) {
        Some(info) => (info.name.clone(), info.unit.clone()),
        None => (sku.to_string(), None),
    }
}

/// Supplier buckets behind a (location, SKU) position. A position that nets
/// to zero or below holds no attributable stock, whatever the buckets say.
fn buckets_at<'a>(
    attributions: &'a AttributionTable,
    empty: &'a SupplierBuckets,
    location: &CanonicalLocation,
    sku: &str,
    quantity: i64,
) -> &'a SupplierBuckets {
    if quantity <= 0 {
        return empty;
    }
    attributions
        .get(location)
        .and_then(|m| m.get(sku))
        .unwrap_or(empty)
}

/// Merge production residuals into the replayed location table and build both views.
pub fn aggregate(
    residuals: ResidualOutcome,
    replayed: ReplayOutcome,
    tie_break: SupplierTieBreak,
) -> Reconciliation {
    let ReplayOutcome {
        mut locations,
        attributions,
        catalog,
        ledger,
        stats,
    } = replayed;

    if !residuals.by_sku.is_empty() {
        let production = locations.entry(CanonicalLocation::Production).or_default();
        for (sku, residual) in residuals.by_sku {
            let held = production.entry(sku).or_insert(0);
            *held = held.saturating_add(residual);
        }
    }

    let empty = SupplierBuckets::new();

    let mut by_location = Vec::new();
    for (location, skus) in &locations {
        let positions: Vec<LocationPosition> = skus
            .iter()
            .filter(|(_, qty)| **qty != 0)
            .map(|(sku, qty)| {
                let (name, unit) = display(&catalog, sku);
                let buckets = buckets_at(&attributions, &empty, location, sku, *qty);
                LocationPosition {
                    sku: sku.clone(),
                    name,
                    unit,
                    quantity: *qty,
                    supplier: buckets.primary(tie_break).map(str::to_string),
                    suppliers: buckets.shares(),
                }
            })
            .collect();

        if positions.is_empty() {
            continue;
        }
        let mut view = LocationView {
            location: location.clone(),
            total: 0,
            positions,
        };
        view.recompute_total();
        by_location.push(view);
    }

    let mut per_sku: BTreeMap<&str, BTreeMap<CanonicalLocation, i64>> = BTreeMap::new();
    for (location, skus) in &locations {
        for (sku, qty) in skus.iter().filter(|(_, qty)| **qty != 0) {
            per_sku
                .entry(sku.as_str())
                .or_default()
                .insert(location.clone(), *qty);
        }
    }

    let mut by_sku = Vec::with_capacity(per_sku.len());
    for (sku, sku_locations) in per_sku {
        let mut suppliers = SupplierBuckets::new();
        for (location, qty) in &sku_locations {
            suppliers.merge(buckets_at(&attributions, &empty, location, sku, *qty));
        }
        let (name, unit) = display(&catalog, sku);
        let mut position = SkuPosition {
            sku: sku.to_string(),
            name,
            unit,
            total: 0,
            locations: sku_locations,
            primary_supplier: suppliers.primary(tie_break).map(str::to_string),
            suppliers: suppliers.shares(),
        };
        position.recompute_total();
        by_sku.push(position);
    }

    Reconciliation {
        by_location,
        by_sku,
        ledger,
        stats,
        skipped_order_lines: residuals.skipped_order_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockrecon_core::OwnerId;
    use stockrecon_movements::{Transfer, TransferLineItem};

    use crate::replay::replay;

    fn residuals(pairs: &[(&str, i64)]) -> ResidualOutcome {
        ResidualOutcome {
            by_sku: pairs.iter().map(|(s, q)| (s.to_string(), *q)).collect(),
            skipped_order_lines: 0,
        }
    }

    fn inbound(to: &str, sku: &str, qty: i64) -> Transfer {
        Transfer::inbound(OwnerId::new(), to, Utc::now())
            .with_line(TransferLineItem::new(sku, qty).with_name(format!("{sku} widget")))
    }

    #[test]
    fn production_residuals_join_the_location_table() {
        let replayed = replay(&[inbound("Production", "A", 5)], &[]);
        let rec = aggregate(residuals(&[("A", 60)]), replayed, SupplierTieBreak::FirstSeen);

        let production = &rec.by_location[0];
        assert_eq!(production.location, CanonicalLocation::Production);
        assert_eq!(production.positions[0].quantity, 65);
        assert_eq!(rec.by_sku[0].total, 65);
        // SKUs only known from purchase orders fall back to the SKU as name.
        let rec = aggregate(residuals(&[("B", 1)]), ReplayOutcome::default(), SupplierTieBreak::FirstSeen);
        assert_eq!(rec.by_sku[0].name, "B");
    }

    #[test]
    fn zero_positions_vanish_from_both_views_but_not_the_ledger() {
        let transfers = vec![
            inbound("Acme Warehouse", "A", 50),
            Transfer::relocation(OwnerId::new(), "Acme Warehouse", "FBA", Utc::now())
                .with_line(TransferLineItem::new("A", 50)),
        ];
        let rec = aggregate(
            ResidualOutcome::default(),
            replay(&transfers, &[]),
            SupplierTieBreak::FirstSeen,
        );

        assert_eq!(rec.by_location.len(), 1);
        assert_eq!(rec.by_location[0].location, CanonicalLocation::FulfillmentCenter);
        assert_eq!(rec.by_location[0].total, 50);
        assert_eq!(rec.by_sku.len(), 1);
        assert!(!rec.by_sku[0]
            .locations
            .contains_key(&CanonicalLocation::SupplierWarehouse));
        assert_eq!(rec.by_sku[0].primary_supplier, None);
        assert_eq!(rec.ledger.len(), 2);
    }

    #[test]
    fn drained_warehouse_stock_names_no_supplier() {
        let owner = OwnerId::new();
        let transfers = vec![
            Transfer::inbound(owner, "Acme Co (Warehouse)", Utc::now())
                .with_line(TransferLineItem::new("A", 50)),
            Transfer::outbound(owner, "Acme Co (Warehouse)", Utc::now())
                .with_line(TransferLineItem::new("A", 50)),
            Transfer::inbound(owner, "FBA", Utc::now()).with_line(TransferLineItem::new("A", 10)),
        ];
        let rec = aggregate(
            ResidualOutcome::default(),
            replay(&transfers, &[]),
            SupplierTieBreak::FirstSeen,
        );

        let sku = &rec.by_sku[0];
        assert_eq!(sku.total, 10);
        assert_eq!(sku.locations.len(), 1);
        assert_eq!(sku.primary_supplier, None);
        assert!(sku.suppliers.is_empty());
        assert_eq!(rec.by_location.len(), 1);
        assert!(rec.by_location[0].positions[0].suppliers.is_empty());
    }

    #[test]
    fn unresolved_move_out_of_a_warehouse_drops_its_attribution() {
        let owner = OwnerId::new();
        let transfers = vec![
            Transfer::inbound(owner, "Acme Co (Warehouse)", Utc::now())
                .with_line(TransferLineItem::new("A", 20)),
            Transfer::relocation(owner, "Supplier Warehouse", "FBA", Utc::now())
                .with_line(TransferLineItem::new("A", 20)),
        ];
        let rec = aggregate(
            ResidualOutcome::default(),
            replay(&transfers, &[]),
            SupplierTieBreak::FirstSeen,
        );

        let sku = &rec.by_sku[0];
        assert_eq!(sku.total, 20);
        assert_eq!(sku.primary_supplier, None);
        assert!(sku.suppliers.is_empty());
    }

    #[test]
    fn primary_supplier_is_the_largest_bucket() {
        let transfers = vec![
            inbound("Acme (Warehouse)", "A", 10),
            inbound("Globex (Warehouse)", "A", 30),
        ];
        let rec = aggregate(
            ResidualOutcome::default(),
            replay(&transfers, &[]),
            SupplierTieBreak::FirstSeen,
        );
        let sku = &rec.by_sku[0];
        assert_eq!(sku.primary_supplier.as_deref(), Some("Globex"));
        assert_eq!(sku.suppliers.len(), 2);
        assert_eq!(sku.suppliers[0].supplier, "Acme");

        let row = &rec.by_location[0].positions[0];
        assert_eq!(row.quantity, 40);
        assert_eq!(row.supplier.as_deref(), Some("Globex"));
        assert_eq!(row.name, "A widget");
    }

    #[test]
    fn sku_with_cancelling_locations_keeps_both_entries() {
        let transfers = vec![
            Transfer::relocation(OwnerId::new(), "Back Office", "FBA", Utc::now())
                .with_line(TransferLineItem::new("A", 3)),
        ];
        let rec = aggregate(
            ResidualOutcome::default(),
            replay(&transfers, &[]),
            SupplierTieBreak::FirstSeen,
        );
        assert_eq!(rec.by_sku[0].total, 0);
        assert_eq!(rec.by_sku[0].locations.len(), 2);
        assert_eq!(rec.by_location.len(), 2);
    }

    #[test]
    fn skipped_counts_add_up() {
        let rec = Reconciliation {
            stats: ReplayStats {
                skipped_line_items: 2,
                ..Default::default()
            },
            skipped_order_lines: 1,
            ..Default::default()
        };
        assert_eq!(rec.skipped_line_items(), 3);
    }
}
