//! Canonical test configurations.

use std::path::Path;

use crate::config::{Config, ReconnectionConfig};

/// Fast reconnection config with zero delays, so tests never wait.
pub fn reconnection() -> ReconnectionConfig {
    ReconnectionConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        backoff_multiplier: 1.0,
        max_consecutive_failures: 3,
        circuit_breaker_cooldown_ms: 0,
    }
}

/// Default config with storage and reports rooted at `root`.
pub fn with_root(root: &Path) -> Config {
    let mut config = Config::default();
    config.storage.dir = root.join("storage");
    config.storage.max_rows = 1;
    config.features.report_dir = root.join("reports");
    config.reconnection = reconnection();
    config
}
