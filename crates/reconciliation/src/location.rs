//! Location canonicalization and supplier-name extraction.
//!
//! Raw location labels are free text ("Acme Co (Warehouse)", "FBA ONT8",
//! "Production", "Back office"). Classification maps each label onto a small
//! fixed set of pipeline stages by ordered, case-insensitive keyword tests.
//! The raw label is kept alongside the canonical tag because supplier
//! attribution needs both.

use serde::{Serialize, Serializer};

/// Substrings marking a third-party-logistics facility.
const THIRD_PARTY_MARKERS: &[&str] = &["3pl", "third party", "third-party", "thirdparty"];

/// Substring marking a supplier-held warehouse (checked after 3PL).
const WAREHOUSE_MARKER: &str = "warehouse";

/// The two known fulfillment-center aliases.
const FULFILLMENT_MARKERS: &[&str] = &["fulfillment", "fba"];

const PRODUCTION_MARKERS: &[&str] = &["production"];

/// Labels that name a stage rather than a facility.
const GENERIC_LABELS: &[&str] = &["supplier", "supplier warehouse", "warehouse"];

/// Canonical key used when a label is absent or blank.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Placeholder supplier name that must never be written as an attribution.
pub const SUPPLIER_PLACEHOLDER: &str = "Supplier";

/// Pipeline stage a raw location label belongs to.
///
/// Ordering follows the pipeline (production first); `Other` labels sort
/// alphabetically after the fixed stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalLocation {
    Production,
    SupplierWarehouse,
    ThirdPartyWarehouse,
    FulfillmentCenter,
    /// Ad-hoc facility; carries the trimmed raw label as its key.
    Other(String),
}

impl CanonicalLocation {
    /// Stable key used in views and JSON output.
    pub fn key(&self) -> &str {
        match self {
            CanonicalLocation::Production => "Production",
            CanonicalLocation::SupplierWarehouse => "Supplier Warehouse",
            CanonicalLocation::ThirdPartyWarehouse => "3PL Warehouse",
            CanonicalLocation::FulfillmentCenter => "Fulfillment Center",
            CanonicalLocation::Other(label) => label,
        }
    }

    pub fn is_supplier_warehouse(&self) -> bool {
        matches!(self, CanonicalLocation::SupplierWarehouse)
    }
}

impl core::fmt::Display for CanonicalLocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for CanonicalLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn non_blank(label: Option<&str>) -> Option<&str> {
    label.map(str::trim).filter(|s| !s.is_empty())
}

/// Classify a raw label. First match wins:
/// 3PL, then warehouse, then fulfillment center, then production, else `Other`.
pub fn canonicalize(raw: Option<&str>) -> CanonicalLocation {
    let Some(label) = non_blank(raw) else {
        return CanonicalLocation::Other(UNKNOWN_LOCATION.to_string());
    };
    let lower = label.to_lowercase();

    if contains_any(&lower, THIRD_PARTY_MARKERS) {
        CanonicalLocation::ThirdPartyWarehouse
    } else if lower.contains(WAREHOUSE_MARKER) {
        CanonicalLocation::SupplierWarehouse
    } else if contains_any(&lower, FULFILLMENT_MARKERS) {
        CanonicalLocation::FulfillmentCenter
    } else if contains_any(&lower, PRODUCTION_MARKERS) {
        CanonicalLocation::Production
    } else {
        CanonicalLocation::Other(label.to_string())
    }
}

/// Whether a label names a pipeline stage instead of a concrete facility.
pub fn is_generic_label(label: &str) -> bool {
    let lower = label.trim().to_lowercase();
    if contains_any(&lower, PRODUCTION_MARKERS)
        || contains_any(&lower, THIRD_PARTY_MARKERS)
        || contains_any(&lower, FULFILLMENT_MARKERS)
    {
        return true;
    }
    // "Supplier (Warehouse)" is as generic as "Supplier".
    let undecorated = lower.strip_suffix("(warehouse)").unwrap_or(&lower).trim();
    undecorated.is_empty() || GENERIC_LABELS.contains(&undecorated)
}

/// Whether a supplier name is the generic placeholder (equivalent to unknown).
pub fn is_placeholder_supplier(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(SUPPLIER_PLACEHOLDER)
}

fn accept_supplier(candidate: &str) -> Option<String> {
    let name = candidate.trim();
    if name.is_empty() || is_placeholder_supplier(name) {
        None
    } else {
        Some(name.to_string())
    }
}

/// Case-insensitive `strip_suffix` for ASCII suffixes.
fn strip_suffix_ignore_case<'a>(label: &'a str, suffix: &str) -> Option<&'a str> {
    let split = label.len().checked_sub(suffix.len())?;
    if !label.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = label.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Infer which supplier holds stock at a supplier-warehouse label.
///
/// Cascade, first accepted candidate wins:
/// 1. authoritative name from the linked purchase order
/// 2. decorated `"<Name> (Warehouse)"`
/// 3. generic `"Supplier Warehouse"` plus a concrete counterpart label
/// 4. legacy `"<Name> Warehouse"`
/// 5. the raw label itself, unless it is a generic stage name
///
/// Empty and placeholder (`Supplier`) candidates are rejected at every step.
pub fn resolve_supplier(
    raw: Option<&str>,
    counterpart: Option<&str>,
    authoritative: Option<&str>,
) -> Option<String> {
    if let Some(name) = authoritative.and_then(accept_supplier) {
        return Some(name);
    }

    let label = non_blank(raw)?;

    if let Some(name) = strip_suffix_ignore_case(label, "(warehouse)").and_then(accept_supplier) {
        return Some(name);
    }

    if label.eq_ignore_ascii_case("supplier warehouse") {
        let from_counterpart = non_blank(counterpart)
            .filter(|c| !is_generic_label(c))
            .and_then(accept_supplier);
        if from_counterpart.is_some() {
            return from_counterpart;
        }
    }

    if let Some(name) = strip_suffix_ignore_case(label, " warehouse").and_then(accept_supplier) {
        return Some(name);
    }

    if !is_generic_label(label) {
        return accept_supplier(label);
    }

    None
}

/// A transfer endpoint: canonical stage plus the attributed supplier, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub location: CanonicalLocation,
    pub supplier: Option<String>,
}

/// Canonicalize an endpoint, resolving its supplier only for supplier warehouses.
pub fn resolve_endpoint(
    raw: Option<&str>,
    counterpart: Option<&str>,
    authoritative: Option<&str>,
) -> ResolvedEndpoint {
    let location = canonicalize(raw);
    let supplier = if location.is_supplier_warehouse() {
        resolve_supplier(raw, counterpart, authoritative)
    } else {
        None
    };
    ResolvedEndpoint { location, supplier }
}
