//! Inventory reconciliation engine.
//!
//! Derives where every SKU currently sits across the supply pipeline
//! (production, supplier warehouse, 3PL, fulfillment center, ad-hoc locations)
//! from two read-only inputs: purchase orders and transfers. Nothing is
//! persisted; every call rebuilds positions from scratch.
//!
//! Stages:
//! - [`residual`]: ordered minus received per purchase order, credited to production
//! - [`replay`]: transfers applied in creation order, with supplier attribution
//! - [`aggregate`]: both merged into by-location and by-SKU views
//! - [`query`]: SKU/location filters and ledger truncation for responses

pub mod aggregate;
pub mod engine;
pub mod location;
pub mod query;
pub mod replay;
pub mod residual;
pub mod supplier;

pub use aggregate::{LocationPosition, LocationView, Reconciliation, SkuPosition};
pub use engine::{ReconcileOptions, reconcile};
pub use location::{CanonicalLocation, canonicalize};
pub use query::{
    DEFAULT_LEDGER_LIMIT, LocationFilter, PositionQuery, PositionSummary, PositionsReport,
    SkuFilter, apply,
};
pub use replay::{LedgerEntry, ReplayStats};
pub use supplier::{SupplierShare, SupplierTieBreak};
