//! Post-aggregation filtering. Never re-runs replay.

use serde::Serialize;

use crate::aggregate::{LocationView, Reconciliation, SkuPosition};
use crate::location::{CanonicalLocation, canonicalize};
use crate::replay::LedgerEntry;

/// Number of most-recent ledger entries returned when the caller does not say.
pub const DEFAULT_LEDGER_LIMIT: usize = 100;

/// Case-insensitive SKU substring filter (matches SKU or display name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuFilter {
    needle: String,
}

impl SkuFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_lowercase();
        (!needle.is_empty()).then_some(Self { needle })
    }

    pub fn matches(&self, sku: &str, name: &str) -> bool {
        sku.to_lowercase().contains(&self.needle) || name.to_lowercase().contains(&self.needle)
    }
}

/// Location filter with the same keyword semantics as canonicalization.
///
/// The filter text is itself canonicalized: `"SupplierWarehouse"`, `"acme
/// warehouse"` and `"Supplier Warehouse"` all select the supplier-warehouse
/// stage. Ad-hoc labels match `Other` locations by substring, and the bare
/// word `other` selects every ad-hoc location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFilter {
    target: CanonicalLocation,
    needle: String,
}

impl LocationFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            target: canonicalize(Some(trimmed)),
            needle: trimmed.to_lowercase(),
        })
    }

    pub fn matches(&self, location: &CanonicalLocation) -> bool {
        if *location == self.target {
            return true;
        }
        match location {
            CanonicalLocation::Other(label) => {
                self.needle == "other" || label.to_lowercase().contains(&self.needle)
            }
            _ => false,
        }
    }

    /// Match a raw label by classifying it first. Absent labels never match.
    pub fn matches_label(&self, raw: Option<&str>) -> bool {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(label) => self.matches(&canonicalize(Some(label))),
            None => false,
        }
    }
}

/// Caller-supplied filters for a positions query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionQuery {
    pub sku: Option<SkuFilter>,
    pub location: Option<LocationFilter>,
    pub ledger_limit: usize,
}

impl Default for PositionQuery {
    fn default() -> Self {
        Self {
            sku: None,
            location: None,
            ledger_limit: DEFAULT_LEDGER_LIMIT,
        }
    }
}

impl PositionQuery {
    pub fn new(sku: Option<&str>, location: Option<&str>) -> Self {
        Self {
            sku: sku.and_then(SkuFilter::parse),
            location: location.and_then(LocationFilter::parse),
            ..Self::default()
        }
    }

    pub fn with_ledger_limit(mut self, limit: usize) -> Self {
        self.ledger_limit = limit;
        self
    }

    fn sku_matches(&self, sku: &str, name: &str) -> bool {
        self.sku.as_ref().is_none_or(|f| f.matches(sku, name))
    }

    fn location_matches(&self, location: &CanonicalLocation) -> bool {
        self.location.as_ref().is_none_or(|f| f.matches(location))
    }

    fn ledger_matches(&self, entry: &LedgerEntry) -> bool {
        let location_ok = self.location.as_ref().is_none_or(|f| {
            f.matches_label(entry.from_location.as_deref())
                || f.matches_label(entry.to_location.as_deref())
        });
        location_ok && self.sku_matches(&entry.sku, &entry.name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSummary {
    pub location_count: usize,
    pub sku_count: usize,
    /// Matching ledger entries before truncation.
    pub movement_count: usize,
    pub skipped_line_items: usize,
}

/// Filtered response for one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsReport {
    pub by_location: Vec<LocationView>,
    pub by_sku: Vec<SkuPosition>,
    /// Most recent matching entries, newest first.
    pub ledger: Vec<LedgerEntry>,
    pub summary: PositionSummary,
}

/// Apply a query to a reconciliation.
pub fn apply(reconciliation: &Reconciliation, query: &PositionQuery) -> PositionsReport {
    let by_location: Vec<LocationView> = reconciliation
        .by_location
        .iter()
        .filter(|view| query.location_matches(&view.location))
        .filter_map(|view| {
            let mut view = view.clone();
            view.positions.retain(|p| query.sku_matches(&p.sku, &p.name));
            if view.positions.is_empty() {
                return None;
            }
            view.recompute_total();
            Some(view)
        })
        .collect();

    let by_sku: Vec<SkuPosition> = reconciliation
        .by_sku
        .iter()
        .filter(|p| query.sku_matches(&p.sku, &p.name))
        .filter_map(|p| {
            let mut p = p.clone();
            if query.location.is_some() {
                p.locations.retain(|loc, _| query.location_matches(loc));
                if p.locations.is_empty() {
                    return None;
                }
                p.recompute_total();
            }
            Some(p)
        })
        .collect();

    let matching: Vec<&LedgerEntry> = reconciliation
        .ledger
        .iter()
        .filter(|e| query.ledger_matches(e))
        .collect();
    let movement_count = matching.len();
    let ledger: Vec<LedgerEntry> = matching
        .into_iter()
        .rev()
        .take(query.ledger_limit)
        .cloned()
        .collect();

    PositionsReport {
        summary: PositionSummary {
            location_count: by_location.len(),
            sku_count: by_sku.len(),
            movement_count,
            skipped_line_items: reconciliation.skipped_line_items(),
        },
        by_location,
        by_sku,
        ledger,
    }
}
