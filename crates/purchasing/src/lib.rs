//! Purchasing domain module (purchase orders as read by the reconciliation engine).
//!
//! This crate contains the purchase order record shape and its lifecycle rules,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod order;
pub mod status;

pub use order::{PurchaseOrder, PurchaseOrderLineItem};
pub use status::{EligibilityPolicy, PurchaseOrderStatus};
