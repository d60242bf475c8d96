//! Upstream collaborator boundaries.
//!
//! The reconciliation engine consumes two read-only sources: purchase orders
//! from procurement and transfers from the movement recorder. Both are
//! owner-scoped and paginated.

pub mod in_memory;
pub mod query;
pub mod r#trait;

pub use in_memory::{InMemoryMovementSource, InMemoryProcurementSource};
pub use query::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, Pagination, PurchaseOrderFilter, TransferFilter,
};
pub use r#trait::{
    MovementSource, ProcurementSource, SourceError, load_all_purchase_orders, load_all_transfers,
};
