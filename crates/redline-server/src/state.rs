//! Shared application state.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use redline_core::{Error, RedlineConfig, Result};
use redline_detect::Detector;
use redline_engine::Redactor;
use redline_oracle::{create_oracle, OracleConfig};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: RedlineConfig,
    pub oracle_config: RwLock<OracleConfig>,
    redactor: RwLock<Arc<Redactor>>,
}

/// Redactor for the judge `oracle_config` resolves to.
pub fn build_redactor(oracle_config: &OracleConfig) -> Redactor {
    Redactor::new(Detector::default(), create_oracle(oracle_config))
}

impl AppState {
    /// Load the judge configuration and build the redactor.
    ///
    /// Fails when a judge is required but no provider resolves.
    pub fn new(config: RedlineConfig) -> Result<Self> {
        let oracle_config = OracleConfig::load(&config.data_paths.oracle_config_file);
        if config.require_oracle && oracle_config.resolve_provider().is_none() {
            return Err(Error::OracleUnavailable(
                "REDLINE_REQUIRE_ORACLE is set but no judge provider is configured".into(),
            ));
        }
        let redactor = build_redactor(&oracle_config);
        info!("Judge: {}", redactor.oracle_name());
        Ok(Self::with_redactor(config, oracle_config, redactor))
    }

    pub fn with_redactor(config: RedlineConfig, oracle_config: OracleConfig, redactor: Redactor) -> Self {
        Self {
            config,
            oracle_config: RwLock::new(oracle_config),
            redactor: RwLock::new(Arc::new(redactor)),
        }
    }

    /// Current redactor. Requests in flight keep the one they started with.
    pub fn redactor(&self) -> Arc<Redactor> {
        Arc::clone(&self.redactor.read())
    }

    /// Swap in a redactor built from the current judge configuration.
    pub fn rebuild_redactor(&self) {
        let redactor = build_redactor(&self.oracle_config.read());
        info!("Judge switched to {}", redactor.oracle_name());
        *self.redactor.write() = Arc::new(redactor);
    }
}
