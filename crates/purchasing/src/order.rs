use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockrecon_core::{OwnerId, PurchaseOrderId, SupplierId};

use crate::status::PurchaseOrderStatus;

/// Purchase order line item as read from the procurement source.
///
/// `sku` and `quantity` are optional because upstream data is not validated;
/// items missing either are skipped by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLineItem {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl PurchaseOrderLineItem {
    pub fn new(sku: impl Into<String>, quantity: i64) -> Self {
        Self {
            sku: Some(sku.into()),
            name: None,
            quantity: Some(quantity),
        }
    }

    /// SKU and ordered quantity, or `None` when the item is malformed.
    pub fn sku_and_quantity(&self) -> Option<(&str, i64)> {
        let sku = self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((sku, self.quantity?))
    }
}

/// Purchase order read model (owned by procurement, read-only here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub owner_id: OwnerId,
    /// Human-readable order number (e.g. `PO-1042`).
    pub po_number: String,
    pub supplier_id: SupplierId,
    /// Supplier display name joined from the supplier directory, when known.
    #[serde(default)]
    pub supplier_name: Option<String>,
    pub status: PurchaseOrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub lines: Vec<PurchaseOrderLineItem>,
}

impl PurchaseOrder {
    pub fn new(
        owner_id: OwnerId,
        po_number: impl Into<String>,
        supplier_id: SupplierId,
        status: PurchaseOrderStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PurchaseOrderId::new(),
            owner_id,
            po_number: po_number.into(),
            supplier_id,
            supplier_name: None,
            status,
            created_at,
            lines: Vec::new(),
        }
    }

    pub fn with_supplier_name(mut self, name: impl Into<String>) -> Self {
        self.supplier_name = Some(name.into());
        self
    }

    pub fn with_line(mut self, sku: impl Into<String>, quantity: i64) -> Self {
        self.lines.push(PurchaseOrderLineItem::new(sku, quantity));
        self
    }
}
