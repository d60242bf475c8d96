//! JSON seed data for the in-memory sources (dev and demos).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockrecon_movements::Transfer;
use stockrecon_purchasing::PurchaseOrder;

use crate::sources::{InMemoryMovementSource, InMemoryProcurementSource, SourceError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid seed json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to load seed records: {0}")]
    Source(#[from] SourceError),
}

/// Seed document: `{ "purchase_orders": [...], "transfers": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub purchase_orders: Vec<PurchaseOrder>,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

/// Number of records loaded from a seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub purchase_orders: usize,
    pub transfers: usize,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn load_into(
        self,
        procurement: &InMemoryProcurementSource,
        movements: &InMemoryMovementSource,
    ) -> Result<SeedSummary, SeedError> {
        let summary = SeedSummary {
            purchase_orders: self.purchase_orders.len(),
            transfers: self.transfers.len(),
        };
        for order in self.purchase_orders {
            procurement.upsert(order)?;
        }
        for transfer in self.transfers {
            movements.record(transfer)?;
        }
        Ok(summary)
    }
}
