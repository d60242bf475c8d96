//! Infrastructure layer: upstream sources, config, seed data, positions service.

pub mod config;
pub mod seed;
pub mod service;
pub mod sources;

pub use config::{ConfigError, ReconConfig};
pub use service::{PositionService, ReconcileError, ServiceSettings};
