//! Per-supplier attribution buckets for stock held in supplier warehouses.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockrecon_core::DomainError;

/// Policy for choosing a primary supplier when the largest buckets tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierTieBreak {
    /// Earliest-attributed supplier wins (replay order).
    #[default]
    FirstSeen,
    /// Lexicographically smallest name wins.
    Alphabetical,
    /// No primary supplier is reported on a tie.
    None,
}

impl FromStr for SupplierTieBreak {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "first_seen" | "firstseen" => Ok(SupplierTieBreak::FirstSeen),
            "alphabetical" => Ok(SupplierTieBreak::Alphabetical),
            "none" => Ok(SupplierTieBreak::None),
            other => Err(DomainError::validation(format!(
                "unknown supplier tie-break '{other}' (expected first_seen, alphabetical or none)"
            ))),
        }
    }
}

/// One supplier's attributed quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierShare {
    pub supplier: String,
    pub quantity: i64,
}

/// Supplier → quantity, kept in first-attributed order.
///
/// Buckets never hold a zero or negative quantity: a bucket that drains to
/// zero or below is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierBuckets {
    buckets: Vec<(String, i64)>,
}

impl SupplierBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, supplier: &str) -> Option<i64> {
        self.buckets
            .iter()
            .find(|(name, _)| name == supplier)
            .map(|(_, q)| *q)
    }

    fn adjust(&mut self, supplier: &str, delta: i64) {
        match self.buckets.iter().position(|(name, _)| name == supplier) {
            Some(idx) => {
                self.buckets[idx].1 = self.buckets[idx].1.saturating_add(delta);
                if self.buckets[idx].1 <= 0 {
                    self.buckets.remove(idx);
                }
            }
            None if delta > 0 => self.buckets.push((supplier.to_string(), delta)),
            None => {}
        }
    }

    pub fn add(&mut self, supplier: &str, quantity: i64) {
        self.adjust(supplier, quantity);
    }

    /// Remove quantity from a supplier's bucket; unknown suppliers are ignored.
    pub fn remove(&mut self, supplier: &str, quantity: i64) {
        if self.get(supplier).is_some() {
            self.adjust(supplier, -quantity);
        }
    }

    /// Fold another set of buckets in, keeping this set's order first.
    pub fn merge(&mut self, other: &SupplierBuckets) {
        for (name, qty) in &other.buckets {
            self.adjust(name, *qty);
        }
    }

    pub fn shares(&self) -> Vec<SupplierShare> {
        self.buckets
            .iter()
            .map(|(supplier, quantity)| SupplierShare {
                supplier: supplier.clone(),
                quantity: *quantity,
            })
            .collect()
    }

    /// Supplier with the largest bucket, ties resolved by `tie_break`.
    pub fn primary(&self, tie_break: SupplierTieBreak) -> Option<&str> {
        let max = self.buckets.iter().map(|(_, q)| *q).max()?;
        let mut leaders = self
            .buckets
            .iter()
            .filter(|(_, q)| *q == max)
            .map(|(name, _)| name.as_str());

        match tie_break {
            SupplierTieBreak::FirstSeen => leaders.next(),
            SupplierTieBreak::Alphabetical => leaders.min(),
            SupplierTieBreak::None => {
                let first = leaders.next();
                if leaders.next().is_some() { None } else { first }
            }
        }
    }
}
