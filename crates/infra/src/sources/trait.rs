use std::sync::Arc;

use thiserror::Error;

use stockrecon_core::OwnerId;
use stockrecon_movements::Transfer;
use stockrecon_purchasing::PurchaseOrder;

use super::query::{Page, Pagination, PurchaseOrderFilter, TransferFilter};

/// Errors returned by upstream collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Read-only access to the procurement collaborator's purchase orders.
#[async_trait::async_trait]
pub trait ProcurementSource: Send + Sync {
    /// Purchase orders for one owner, line items included.
    async fn fetch_purchase_orders(
        &self,
        owner_id: OwnerId,
        filter: PurchaseOrderFilter,
        pagination: Pagination,
    ) -> Result<Page<PurchaseOrder>, SourceError>;
}

/// Read-only access to the movement-recording collaborator's transfers.
#[async_trait::async_trait]
pub trait MovementSource: Send + Sync {
    /// Transfers for one owner ordered by creation time (ascending), line
    /// items included.
    async fn fetch_transfers(
        &self,
        owner_id: OwnerId,
        filter: TransferFilter,
        pagination: Pagination,
    ) -> Result<Page<Transfer>, SourceError>;
}

#[async_trait::async_trait]
impl<S> ProcurementSource for Arc<S>
where
    S: ProcurementSource + ?Sized,
{
    async fn fetch_purchase_orders(
        &self,
        owner_id: OwnerId,
        filter: PurchaseOrderFilter,
        pagination: Pagination,
    ) -> Result<Page<PurchaseOrder>, SourceError> {
        (**self)
            .fetch_purchase_orders(owner_id, filter, pagination)
            .await
    }
}

#[async_trait::async_trait]
impl<S> MovementSource for Arc<S>
where
    S: MovementSource + ?Sized,
{
    async fn fetch_transfers(
        &self,
        owner_id: OwnerId,
        filter: TransferFilter,
        pagination: Pagination,
    ) -> Result<Page<Transfer>, SourceError> {
        (**self).fetch_transfers(owner_id, filter, pagination).await
    }
}

/// Drain every page of purchase orders for an owner.
pub async fn load_all_purchase_orders<S>(
    source: &S,
    owner_id: OwnerId,
    filter: PurchaseOrderFilter,
    page_size: u32,
) -> Result<Vec<PurchaseOrder>, SourceError>
where
    S: ProcurementSource + ?Sized,
{
    let mut pagination = Pagination::new(Some(page_size), None);
    let mut all = Vec::new();
    loop {
        let page = source
            .fetch_purchase_orders(owner_id, filter.clone(), pagination)
            .await?;
        let fetched = page.items.len();
        all.extend(page.items);
        if !page.has_more || fetched == 0 {
            return Ok(all);
        }
        pagination = pagination.next();
    }
}

/// Drain every page of transfers for an owner, preserving source order.
pub async fn load_all_transfers<S>(
    source: &S,
    owner_id: OwnerId,
    filter: TransferFilter,
    page_size: u32,
) -> Result<Vec<Transfer>, SourceError>
where
    S: MovementSource + ?Sized,
{
    let mut pagination = Pagination::new(Some(page_size), None);
    let mut all = Vec::new();
    loop {
        let page = source
            .fetch_transfers(owner_id, filter.clone(), pagination)
            .await?;
        let fetched = page.items.len();
        all.extend(page.items);
        if !page.has_more || fetched == 0 {
            return Ok(all);
        }
        pagination = pagination.next();
    }
}
