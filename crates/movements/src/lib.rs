//! Movements domain module (transfers between named locations).
//!
//! Transfers are append-only facts recorded by the movement collaborator. This
//! crate only describes their shape and the per-line validation the replay
//! engine relies on (no IO, no HTTP, no storage).

pub mod transfer;

pub use transfer::{LineItemIssue, Transfer, TransferKind, TransferLineItem, ValidLineItem};
