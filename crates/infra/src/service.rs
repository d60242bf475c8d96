//! Positions service: concurrent upstream reads, then one pure reconciliation.

use thiserror::Error;

use stockrecon_core::OwnerId;
use stockrecon_reconciliation::{
    PositionQuery, PositionsReport, ReconcileOptions, SupplierTieBreak, apply, reconcile,
};

use crate::config::ReconConfig;
use crate::sources::{
    MovementSource, ProcurementSource, PurchaseOrderFilter, SourceError, TransferFilter,
    load_all_purchase_orders, load_all_transfers,
};

pub const PROCUREMENT: &str = "procurement";
pub const MOVEMENTS: &str = "movements";

/// Failure of a whole positions request. There is no partial result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("{collaborator} read failed: {message}")]
    Upstream {
        collaborator: &'static str,
        message: String,
    },

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ReconcileError {
    fn upstream(collaborator: &'static str, err: SourceError) -> Self {
        tracing::error!(collaborator, error = %err, "upstream read failed");
        Self::Upstream {
            collaborator,
            message: err.to_string(),
        }
    }
}

/// Service-level knobs (from `ReconConfig`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub page_size: u32,
    pub options: ReconcileOptions,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from(&ReconConfig::default())
    }
}

impl From<&ReconConfig> for ServiceSettings {
    fn from(config: &ReconConfig) -> Self {
        Self {
            page_size: config.page_size,
            options: ReconcileOptions::default().with_eligibility(config.eligibility.clone()),
        }
    }
}

/// Stateless positions service over the two upstream collaborators.
#[derive(Debug, Clone)]
pub struct PositionService<P, M> {
    procurement: P,
    movements: M,
    settings: ServiceSettings,
}

impl<P, M> PositionService<P, M>
where
    P: ProcurementSource,
    M: MovementSource,
{
    pub fn new(procurement: P, movements: M, settings: ServiceSettings) -> Self {
        Self {
            procurement,
            movements,
            settings,
        }
    }

    /// Read everything for `owner_id`, reconcile, then filter.
    ///
    /// Every purchase order is fetched (eligibility is applied by the engine)
    /// so ledger entries can show order numbers for any referenced order.
    #[tracing::instrument(skip(self, owner_id, query), fields(owner_id = %owner_id))]
    pub async fn get_positions(
        &self,
        owner_id: OwnerId,
        query: &PositionQuery,
        tie_break: SupplierTieBreak,
    ) -> Result<PositionsReport, ReconcileError> {
        let page_size = self.settings.page_size;

        let orders = async {
            load_all_purchase_orders(
                &self.procurement,
                owner_id,
                PurchaseOrderFilter::default(),
                page_size,
            )
            .await
            .map_err(|e| ReconcileError::upstream(PROCUREMENT, e))
        };
        let transfers = async {
            load_all_transfers(&self.movements, owner_id, TransferFilter::default(), page_size)
                .await
                .map_err(|e| ReconcileError::upstream(MOVEMENTS, e))
        };
        let (orders, transfers) = tokio::try_join!(orders, transfers)?;

        let options = self.settings.options.clone().with_tie_break(tie_break);
        let reconciliation = reconcile(&orders, &transfers, &options);
        let report = apply(&reconciliation, query);

        tracing::info!(
            orders = orders.len(),
            transfers = transfers.len(),
            locations = report.summary.location_count,
            skus = report.summary.sku_count,
            movements = report.summary.movement_count,
            skipped_line_items = report.summary.skipped_line_items,
            "positions computed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{Duration, TimeZone, Utc};
    use stockrecon_core::SupplierId;
    use stockrecon_movements::{Transfer, TransferLineItem};
    use stockrecon_purchasing::{PurchaseOrder, PurchaseOrderStatus};
    use stockrecon_reconciliation::CanonicalLocation;

    use crate::sources::{
        InMemoryMovementSource, InMemoryProcurementSource, Page, Pagination,
    };

    struct DownMovements;

    #[async_trait::async_trait]
    impl MovementSource for DownMovements {
        async fn fetch_transfers(
            &self,
            _owner_id: OwnerId,
            _filter: TransferFilter,
            _pagination: Pagination,
        ) -> Result<Page<Transfer>, SourceError> {
            Err(SourceError::Unavailable("connection refused".to_string()))
        }
    }

    /// Counts calls so pagination draining is observable.
    struct CountingProcurement {
        inner: InMemoryProcurementSource,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ProcurementSource for CountingProcurement {
        async fn fetch_purchase_orders(
            &self,
            owner_id: OwnerId,
            filter: PurchaseOrderFilter,
            pagination: Pagination,
        ) -> Result<Page<PurchaseOrder>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner
                .fetch_purchase_orders(owner_id, filter, pagination)
                .await
        }
    }

    fn seeded(owner: OwnerId) -> (Arc<InMemoryProcurementSource>, Arc<InMemoryMovementSource>) {
        let t0 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let procurement = Arc::new(InMemoryProcurementSource::new());
        let movements = Arc::new(InMemoryMovementSource::new());

        let order = PurchaseOrder::new(
            owner,
            "PO-9",
            SupplierId::new(),
            PurchaseOrderStatus::Accepted,
            t0,
        )
        .with_supplier_name("Acme Co")
        .with_line("A", 100);
        movements
            .record(
                Transfer::inbound(owner, "Supplier Warehouse", t0 + Duration::days(3))
                    .with_purchase_order(order.id)
                    .with_line(TransferLineItem::new("A", 40)),
            )
            .unwrap();
        procurement.upsert(order).unwrap();

        (procurement, movements)
    }

    #[tokio::test]
    async fn positions_combine_both_sources() {
        let owner = OwnerId::new();
        let (procurement, movements) = seeded(owner);
        let service = PositionService::new(procurement, movements, ServiceSettings::default());

        let report = service
            .get_positions(owner, &PositionQuery::default(), SupplierTieBreak::FirstSeen)
            .await
            .unwrap();

        assert_eq!(report.summary.location_count, 2);
        let sku = &report.by_sku[0];
        assert_eq!(sku.total, 100);
        assert_eq!(sku.locations.get(&CanonicalLocation::Production), Some(&60));
        assert_eq!(sku.primary_supplier.as_deref(), Some("Acme Co"));
        assert_eq!(report.ledger[0].po_number.as_deref(), Some("PO-9"));
    }

    #[tokio::test]
    async fn other_owners_see_nothing() {
        let (procurement, movements) = seeded(OwnerId::new());
        let service = PositionService::new(procurement, movements, ServiceSettings::default());
        let report = service
            .get_positions(OwnerId::new(), &PositionQuery::default(), SupplierTieBreak::FirstSeen)
            .await
            .unwrap();
        assert_eq!(report, PositionsReport::default());
    }

    #[tokio::test]
    async fn upstream_failure_fails_the_whole_request() {
        let owner = OwnerId::new();
        let (procurement, _) = seeded(owner);
        let service = PositionService::new(procurement, DownMovements, ServiceSettings::default());

        let err = service
            .get_positions(owner, &PositionQuery::default(), SupplierTieBreak::FirstSeen)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ReconcileError::Upstream {
                collaborator: MOVEMENTS,
                message: "source unavailable: connection refused".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn small_pages_are_drained() {
        let owner = OwnerId::new();
        let inner = InMemoryProcurementSource::new();
        let t0 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        for n in 0..5 {
            inner
                .upsert(
                    PurchaseOrder::new(
                        owner,
                        format!("PO-{n}"),
                        SupplierId::new(),
                        PurchaseOrderStatus::InProgress,
                        t0 + Duration::hours(n),
                    )
                    .with_line("A", 1),
                )
                .unwrap();
        }
        let procurement = Arc::new(CountingProcurement {
            inner,
            calls: AtomicUsize::new(0),
        });
        let settings = ServiceSettings {
            page_size: 2,
            ..ServiceSettings::default()
        };
        let service = PositionService::new(
            procurement.clone(),
            Arc::new(InMemoryMovementSource::new()),
            settings,
        );

        let report = service
            .get_positions(owner, &PositionQuery::default(), SupplierTieBreak::FirstSeen)
            .await
            .unwrap();
        assert_eq!(report.by_sku[0].total, 5);
        assert_eq!(procurement.calls.load(Ordering::SeqCst), 3);
    }
}
