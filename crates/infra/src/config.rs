//! Configuration loading and representation.
//!
//! Everything comes from `STOCKRECON_*` environment variables; unset
//! variables fall back to defaults, invalid ones fail with the variable name.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use stockrecon_observability::LogFormat;
use stockrecon_purchasing::EligibilityPolicy;
use stockrecon_reconciliation::DEFAULT_LEDGER_LIMIT;

use crate::sources::MAX_PAGE_SIZE;

pub const ENV_BIND_ADDR: &str = "STOCKRECON_BIND_ADDR";
pub const ENV_LEDGER_LIMIT: &str = "STOCKRECON_LEDGER_LIMIT";
pub const ENV_PAGE_SIZE: &str = "STOCKRECON_PAGE_SIZE";
pub const ENV_ELIGIBLE_STATUSES: &str = "STOCKRECON_ELIGIBLE_STATUSES";
pub const ENV_LOG_FORMAT: &str = "STOCKRECON_LOG_FORMAT";
pub const ENV_SEED_PATH: &str = "STOCKRECON_SEED_PATH";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PAGE_SIZE: u32 = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            message: message.into(),
        }
    }
}

/// Process configuration for the positions service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconConfig {
    pub bind_addr: SocketAddr,
    pub ledger_limit: usize,
    /// Page size used when draining upstream reads.
    pub page_size: u32,
    pub eligibility: EligibilityPolicy,
    pub log_format: LogFormat,
    pub seed_path: Option<PathBuf>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            ledger_limit: DEFAULT_LEDGER_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            eligibility: EligibilityPolicy::default(),
            log_format: LogFormat::Json,
            seed_path: None,
        }
    }
}

impl ReconConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = get(ENV_BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid(ENV_BIND_ADDR, e.to_string()))?;

        let ledger_limit = match get(ENV_LEDGER_LIMIT) {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|e| ConfigError::invalid(ENV_LEDGER_LIMIT, e.to_string()))?,
            None => DEFAULT_LEDGER_LIMIT,
        };

        let page_size = match get(ENV_PAGE_SIZE) {
            Some(raw) => {
                let n = raw
                    .parse::<u32>()
                    .map_err(|e| ConfigError::invalid(ENV_PAGE_SIZE, e.to_string()))?;
                if n == 0 {
                    return Err(ConfigError::invalid(ENV_PAGE_SIZE, "must be at least 1"));
                }
                n.min(MAX_PAGE_SIZE)
            }
            None => DEFAULT_PAGE_SIZE,
        };

        let eligibility = match get(ENV_ELIGIBLE_STATUSES) {
            Some(raw) => EligibilityPolicy::parse_list(&raw)
                .map_err(|e| ConfigError::invalid(ENV_ELIGIBLE_STATUSES, e.to_string()))?,
            None => EligibilityPolicy::default(),
        };

        let log_format = match get(ENV_LOG_FORMAT) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid(ENV_LOG_FORMAT, e))?,
            None => LogFormat::Json,
        };

        Ok(Self {
            bind_addr,
            ledger_limit,
            page_size,
            eligibility,
            log_format,
            seed_path: get(ENV_SEED_PATH).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use stockrecon_purchasing::PurchaseOrderStatus;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ReconConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ReconConfig::default());
        assert_eq!(config.ledger_limit, 100);
        assert_eq!(config.page_size, 500);
    }

    #[test]
    fn reads_every_variable() {
        let config = ReconConfig::from_lookup(lookup(&[
            (ENV_BIND_ADDR, "127.0.0.1:9000"),
            (ENV_LEDGER_LIMIT, "25"),
            (ENV_PAGE_SIZE, "5000"),
            (ENV_ELIGIBLE_STATUSES, "approved, shipped"),
            (ENV_LOG_FORMAT, "pretty"),
            (ENV_SEED_PATH, "/tmp/seed.json"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.ledger_limit, 25);
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
        assert!(config.eligibility.is_eligible(PurchaseOrderStatus::Shipped));
        assert!(!config.eligibility.is_eligible(PurchaseOrderStatus::Delivered));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.seed_path, Some(PathBuf::from("/tmp/seed.json")));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = ReconConfig::from_lookup(lookup(&[(ENV_LEDGER_LIMIT, "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_LEDGER_LIMIT, .. }));

        let err = ReconConfig::from_lookup(lookup(&[(ENV_ELIGIBLE_STATUSES, "draft")])).unwrap_err();
        assert!(err.to_string().contains(ENV_ELIGIBLE_STATUSES));

        let err = ReconConfig::from_lookup(lookup(&[(ENV_PAGE_SIZE, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_PAGE_SIZE, .. }));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = ReconConfig::from_lookup(lookup(&[(ENV_SEED_PATH, "  ")])).unwrap();
        assert_eq!(config.seed_path, None);
    }
}
