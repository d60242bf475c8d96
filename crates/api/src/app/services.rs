use std::sync::Arc;

use stockrecon_infra::ReconConfig;
use stockrecon_infra::seed::{SeedData, SeedError};
use stockrecon_infra::service::{PositionService, ServiceSettings};
use stockrecon_infra::sources::{
    InMemoryMovementSource, InMemoryProcurementSource, MovementSource, ProcurementSource,
};

pub type DynProcurement = Arc<dyn ProcurementSource>;
pub type DynMovements = Arc<dyn MovementSource>;

/// Shared state behind every route.
pub struct AppServices {
    pub positions: PositionService<DynProcurement, DynMovements>,
    pub default_ledger_limit: usize,
}

impl AppServices {
    pub fn new(
        procurement: DynProcurement,
        movements: DynMovements,
        settings: ServiceSettings,
        default_ledger_limit: usize,
    ) -> Self {
        Self {
            positions: PositionService::new(procurement, movements, settings),
            default_ledger_limit,
        }
    }

    pub fn from_config(
        procurement: DynProcurement,
        movements: DynMovements,
        config: &ReconConfig,
    ) -> Self {
        Self::new(
            procurement,
            movements,
            ServiceSettings::from(config),
            config.ledger_limit,
        )
    }
}

/// In-memory sources, seeded from `config.seed_path` when set.
pub fn build_in_memory_services(config: &ReconConfig) -> Result<AppServices, SeedError> {
    let procurement = Arc::new(InMemoryProcurementSource::new());
    let movements = Arc::new(InMemoryMovementSource::new());

    if let Some(path) = &config.seed_path {
        let summary = SeedData::from_path(path)?.load_into(&procurement, &movements)?;
        tracing::info!(
            path = %path.display(),
            purchase_orders = summary.purchase_orders,
            transfers = summary.transfers,
            "loaded seed data"
        );
    }

    Ok(AppServices::from_config(procurement, movements, config))
}
