use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockrecon_core::{DomainError, OwnerId, PurchaseOrderId, TransferId};

/// Kind of movement a transfer records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    /// Goods entering the tracked universe from an external supplier.
    In,
    /// Goods relocating between two tracked locations.
    Move,
    /// Goods leaving the tracked universe (sale, damage, return).
    Out,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::In => "in",
            TransferKind::Move => "move",
            TransferKind::Out => "out",
        }
    }

    /// Sign of the effect on a SKU's cross-location total.
    pub fn net_sign(&self) -> i64 {
        match self {
            TransferKind::In => 1,
            TransferKind::Move => 0,
            TransferKind::Out => -1,
        }
    }
}

impl core::fmt::Display for TransferKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" => Ok(TransferKind::In),
            "move" => Ok(TransferKind::Move),
            "out" => Ok(TransferKind::Out),
            other => Err(DomainError::validation(format!(
                "unknown transfer kind '{other}'"
            ))),
        }
    }
}

/// Reason a transfer line item cannot be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LineItemIssue {
    #[error("line item has no sku")]
    MissingSku,
    #[error("line item has no quantity")]
    MissingQuantity,
}

/// Transfer line item as recorded upstream (fields unvalidated).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransferLineItem {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A line item with the fields replay depends on present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidLineItem<'a> {
    pub sku: &'a str,
    /// Display name, falling back to the SKU.
    pub name: &'a str,
    pub quantity: i64,
    pub unit: Option<&'a str>,
}

impl TransferLineItem {
    pub fn new(sku: impl Into<String>, quantity: i64) -> Self {
        Self {
            sku: Some(sku.into()),
            name: None,
            quantity: Some(quantity),
            unit: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn validate(&self) -> Result<ValidLineItem<'_>, LineItemIssue> {
        let sku = self
            .sku
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(LineItemIssue::MissingSku)?;
        let quantity = self.quantity.ok_or(LineItemIssue::MissingQuantity)?;
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(sku);
        let unit = self.unit.as_deref().map(str::trim).filter(|s| !s.is_empty());

        Ok(ValidLineItem {
            sku,
            name,
            quantity,
            unit,
        })
    }
}

/// One movement record: a kind, two raw location labels and its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub owner_id: OwnerId,
    pub kind: TransferKind,
    #[serde(default)]
    pub purchase_order_id: Option<PurchaseOrderId>,
    #[serde(default)]
    pub from_location: Option<String>,
    #[serde(default)]
    pub to_location: Option<String>,
    /// Defines replay order.
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub lines: Vec<TransferLineItem>,
}

impl Transfer {
    fn with_kind(owner_id: OwnerId, kind: TransferKind, created_at: DateTime<Utc>) -> Self {
        Self {
            id: TransferId::new(),
            owner_id,
            kind,
            purchase_order_id: None,
            from_location: None,
            to_location: None,
            created_at,
            lines: Vec::new(),
        }
    }

    pub fn inbound(owner_id: OwnerId, to: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let mut t = Self::with_kind(owner_id, TransferKind::In, created_at);
        t.to_location = Some(to.into());
        t
    }

    pub fn relocation(
        owner_id: OwnerId,
        from: impl Into<String>,
        to: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut t = Self::with_kind(owner_id, TransferKind::Move, created_at);
        t.from_location = Some(from.into());
        t.to_location = Some(to.into());
        t
    }

    pub fn outbound(owner_id: OwnerId, from: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let mut t = Self::with_kind(owner_id, TransferKind::Out, created_at);
        t.from_location = Some(from.into());
        t
    }

    pub fn with_purchase_order(mut self, order_id: PurchaseOrderId) -> Self {
        self.purchase_order_id = Some(order_id);
        self
    }

    pub fn with_line(mut self, line: TransferLineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn from_label(&self) -> Option<&str> {
        self.from_location.as_deref()
    }

    pub fn to_label(&self) -> Option<&str> {
        self.to_location.as_deref()
    }
}
