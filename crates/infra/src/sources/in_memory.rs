use std::collections::HashMap;
use std::sync::RwLock;

use stockrecon_core::OwnerId;
use stockrecon_movements::Transfer;
use stockrecon_purchasing::PurchaseOrder;

use super::query::{Page, Pagination, PurchaseOrderFilter, TransferFilter};
use super::r#trait::{MovementSource, ProcurementSource, SourceError};

fn poisoned() -> SourceError {
    SourceError::Unavailable("lock poisoned".to_string())
}

/// In-memory procurement collaborator.
///
/// Intended for tests/dev. Records are partitioned by owner.
#[derive(Debug, Default)]
pub struct InMemoryProcurementSource {
    orders: RwLock<HashMap<OwnerId, Vec<PurchaseOrder>>>,
}

impl InMemoryProcurementSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a purchase order (matched by id).
    pub fn upsert(&self, order: PurchaseOrder) -> Result<(), SourceError> {
        let mut orders = self.orders.write().map_err(|_| poisoned())?;
        let owned = orders.entry(order.owner_id).or_default();
        match owned.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => *existing = order,
            None => owned.push(order),
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.orders
            .read()
            .map(|m| m.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ProcurementSource for InMemoryProcurementSource {
    async fn fetch_purchase_orders(
        &self,
        owner_id: OwnerId,
        filter: PurchaseOrderFilter,
        pagination: Pagination,
    ) -> Result<Page<PurchaseOrder>, SourceError> {
        let orders = self.orders.read().map_err(|_| poisoned())?;
        let mut matching: Vec<PurchaseOrder> = orders
            .get(&owner_id)
            .map(|owned| {
                owned
                    .iter()
                    .filter(|o| filter.matches(o.status))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matching.sort_by_key(|o| o.created_at);
        Ok(Page::slice(&matching, pagination))
    }
}

/// In-memory movement collaborator (append-only).
#[derive(Debug, Default)]
pub struct InMemoryMovementSource {
    transfers: RwLock<HashMap<OwnerId, Vec<Transfer>>>,
}

impl InMemoryMovementSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, transfer: Transfer) -> Result<(), SourceError> {
        let mut transfers = self.transfers.write().map_err(|_| poisoned())?;
        transfers.entry(transfer.owner_id).or_default().push(transfer);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.transfers
            .read()
            .map(|m| m.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl MovementSource for InMemoryMovementSource {
    async fn fetch_transfers(
        &self,
        owner_id: OwnerId,
        filter: TransferFilter,
        pagination: Pagination,
    ) -> Result<Page<Transfer>, SourceError> {
        if filter.is_inverted() {
            return Err(SourceError::Query(
                "created_after is later than created_before".to_string(),
            ));
        }
        let transfers = self.transfers.read().map_err(|_| poisoned())?;
        let mut matching: Vec<Transfer> = transfers
            .get(&owner_id)
            .map(|owned| {
                owned
                    .iter()
                    .filter(|t| filter.matches(t.created_at))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // Stable: equal timestamps keep recording order.
        matching.sort_by_key(|t| t.created_at);
        Ok(Page::slice(&matching, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{load_all_purchase_orders, load_all_transfers};
    use chrono::{Duration, TimeZone, Utc};
    use stockrecon_core::SupplierId;
    use stockrecon_movements::TransferLineItem;
    use stockrecon_purchasing::PurchaseOrderStatus;

    fn test_order(owner: OwnerId, n: u32, status: PurchaseOrderStatus) -> PurchaseOrder {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(n as i64);
        PurchaseOrder::new(owner, format!("PO-{n}"), SupplierId::new(), status, at)
            .with_line("SKU", 10)
    }

    #[tokio::test]
    async fn purchase_orders_are_owner_scoped_and_status_filtered() {
        let source = InMemoryProcurementSource::new();
        let owner = OwnerId::new();
        let other = OwnerId::new();
        source.upsert(test_order(owner, 1, PurchaseOrderStatus::Accepted)).unwrap();
        source.upsert(test_order(owner, 2, PurchaseOrderStatus::Draft)).unwrap();
        source.upsert(test_order(other, 3, PurchaseOrderStatus::Accepted)).unwrap();

        let filter = PurchaseOrderFilter {
            statuses: Some(vec![PurchaseOrderStatus::Accepted]),
        };
        let page = source
            .fetch_purchase_orders(owner, filter, Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].po_number, "PO-1");
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let source = InMemoryProcurementSource::new();
        let owner = OwnerId::new();
        let order = test_order(owner, 1, PurchaseOrderStatus::Submitted);
        source.upsert(order.clone()).unwrap();
        let mut accepted = order;
        accepted.status = PurchaseOrderStatus::Accepted;
        source.upsert(accepted).unwrap();

        assert_eq!(source.len(), 1);
        let all = load_all_purchase_orders(&source, owner, PurchaseOrderFilter::default(), 10)
            .await
            .unwrap();
        assert_eq!(all[0].status, PurchaseOrderStatus::Accepted);
    }

    #[tokio::test]
    async fn loaders_drain_every_page_in_creation_order() {
        let source = InMemoryMovementSource::new();
        let owner = OwnerId::new();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        // Recorded newest first; reads come back oldest first.
        for i in (0..7).rev() {
            source
                .record(
                    Transfer::inbound(owner, "FBA", t0 + Duration::minutes(i))
                        .with_line(TransferLineItem::new("SKU", 1)),
                )
                .unwrap();
        }

        let all = load_all_transfers(&source, owner, TransferFilter::default(), 3)
            .await
            .unwrap();
        assert_eq!(all.len(), 7);
        assert!(all.windows(2).all(|w| w[0].created_at <= w[1].created_at));

        let windowed = TransferFilter {
            created_after: Some(t0 + Duration::minutes(2)),
            created_before: Some(t0 + Duration::minutes(5)),
        };
        let some = load_all_transfers(&source, owner, windowed, 100).await.unwrap();
        assert_eq!(some.len(), 3);
    }

    #[tokio::test]
    async fn inverted_time_window_is_a_query_error() {
        let source = InMemoryMovementSource::new();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let inverted = TransferFilter {
            created_after: Some(t0 + Duration::hours(1)),
            created_before: Some(t0),
        };
        let err = source
            .fetch_transfers(OwnerId::new(), inverted, Pagination::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Query(_)));
    }
}
