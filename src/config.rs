//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file. AWS credentials are never read
//! from the file; the S3 client resolves them through the standard provider
//! chain (environment, profile, instance metadata).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use crate::domain::Symbol;
use crate::error::{ConfigError, Result};

/// MBP depths offered by the incremental feed.
pub const SUPPORTED_BOOK_LEVELS: [u16; 4] = [5, 20, 150, 400];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default = "default_symbols")]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub book: BookConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reconnection: ReconnectionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

fn default_symbols() -> Vec<Symbol> {
    vec![Symbol::new("btcusdt")]
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Market stream (depth, trades).
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Incremental MBP feed.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
}

fn default_ws_url() -> String {
    "wss://api.huobi.pro/ws".into()
}

fn default_feed_url() -> String {
    "wss://api.huobi.pro/feed".into()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            feed_url: default_feed_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookConfig {
    /// MBP depth to subscribe to.
    #[serde(default = "default_book_levels")]
    pub levels: u16,
}

const fn default_book_levels() -> u16 {
    150
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            levels: default_book_levels(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// WebSocket reconnection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectionConfig {
    /// Initial delay before first reconnection attempt (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnection attempts (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied to delay after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Maximum consecutive failures before circuit breaker trips.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// Cooldown period after circuit breaker trips (milliseconds).
    #[serde(default = "default_circuit_breaker_cooldown_ms")]
    pub circuit_breaker_cooldown_ms: u64,
}

fn default_initial_delay_ms() -> u64 {
    1000 // 1 second
}

fn default_max_delay_ms() -> u64 {
    60000 // 60 seconds
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_consecutive_failures() -> u32 {
    10
}

fn default_circuit_breaker_cooldown_ms() -> u64 {
    300000 // 5 minutes
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_consecutive_failures: default_max_consecutive_failures(),
            circuit_breaker_cooldown_ms: default_circuit_breaker_cooldown_ms(),
        }
    }
}

/// Local JSON-lines persistence and periodic upload.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root folder for the per-stream data folders.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
    /// Rows appended between flushes to disk.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    /// Seconds between uploads of the current files.
    #[serde(default = "default_upload_interval_secs")]
    pub upload_interval_secs: u64,
    #[serde(default)]
    pub s3: S3Config,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("storage")
}

const fn default_max_rows() -> usize {
    100
}

const fn default_upload_interval_secs() -> u64 {
    300
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            max_rows: default_max_rows(),
            upload_interval_secs: default_upload_interval_secs(),
            s3: S3Config::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_bucket() -> String {
    "huobi-openbook".into()
}

fn default_region() -> String {
    "us-east-1".into()
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            enabled: false,
            bucket: default_bucket(),
            region: default_region(),
        }
    }
}

/// Feature graph selection and CSV report output.
#[derive(Debug, Clone, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_enabled_features")]
    pub enabled: Vec<String>,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
}

fn default_enabled_features() -> Vec<String> {
    vec![
        "best_ask".to_string(),
        "best_bid".to_string(),
        "mid_price".to_string(),
    ]
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports/featuregraph")
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_features(),
            report_dir: default_report_dir(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text.
    #[allow(clippy::result_large_err)]
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        validate_ws_url("ws_url", &self.network.ws_url)?;
        validate_ws_url("feed_url", &self.network.feed_url)?;

        if self.symbols.is_empty() {
            return Err(ConfigError::MissingField { field: "symbols" }.into());
        }
        if self.symbols.iter().any(|s| s.as_str().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "symbols",
                reason: "symbols cannot be empty strings".to_string(),
            }
            .into());
        }

        if !SUPPORTED_BOOK_LEVELS.contains(&self.book.levels) {
            return Err(ConfigError::InvalidValue {
                field: "levels",
                reason: format!("must be one of {SUPPORTED_BOOK_LEVELS:?}"),
            }
            .into());
        }

        if self.reconnection.initial_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "initial_delay_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.reconnection.max_delay_ms < self.reconnection.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "max_delay_ms",
                reason: "must be >= initial_delay_ms".to_string(),
            }
            .into());
        }
        let multiplier = self.reconnection.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be a finite number >= 1.0".to_string(),
            }
            .into());
        }
        if self.reconnection.max_consecutive_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_consecutive_failures",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.reconnection.circuit_breaker_cooldown_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "circuit_breaker_cooldown_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.storage.max_rows == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_rows",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.storage.upload_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upload_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.storage.s3.enabled && self.storage.s3.bucket.is_empty() {
            return Err(ConfigError::MissingField { field: "bucket" }.into());
        }
        if self.storage.s3.enabled && self.storage.s3.region.is_empty() {
            return Err(ConfigError::MissingField { field: "region" }.into());
        }

        Ok(())
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

#[allow(clippy::result_large_err)]
fn validate_ws_url(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ConfigError::MissingField { field }.into());
    }
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected ws:// or wss:// scheme, got {}", url.scheme()),
        }
        .into());
    }
    Ok(())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            symbols: default_symbols(),
            book: BookConfig::default(),
            logging: LoggingConfig::default(),
            reconnection: ReconnectionConfig::default(),
            storage: StorageConfig::default(),
            features: FeaturesConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.network.ws_url, "wss://api.huobi.pro/ws");
        assert_eq!(config.network.feed_url, "wss://api.huobi.pro/feed");
        assert_eq!(config.symbols, vec![Symbol::new("btcusdt")]);
        assert_eq!(config.book.levels, 150);
        assert_eq!(config.storage.max_rows, 100);
        assert_eq!(config.storage.upload_interval_secs, 300);
        assert!(!config.storage.s3.enabled);
        assert_eq!(config.storage.s3.bucket, "huobi-openbook");
        assert_eq!(config.features.enabled.len(), 3);
    }

    #[test]
    fn symbols_are_normalized() {
        let config = Config::parse(r#"symbols = ["BTCUSDT", "EthUsdt"]"#).unwrap();
        assert_eq!(
            config.symbols,
            vec![Symbol::new("btcusdt"), Symbol::new("ethusdt")]
        );
    }

    #[test]
    fn rejects_http_scheme() {
        let result = Config::parse(
            r#"
[network]
ws_url = "https://api.huobi.pro/ws"
"#,
        );

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { field: "ws_url", .. }))
        ));
    }

    #[test]
    fn rejects_unsupported_book_levels() {
        let result = Config::parse(
            r#"
[book]
levels = 50
"#,
        );

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { field: "levels", .. }))
        ));
    }

    #[test]
    fn rejects_empty_symbol_list() {
        let result = Config::parse("symbols = []");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField { field: "symbols" }))
        ));
    }

    #[test]
    fn default_matches_empty_parse() {
        let parsed = Config::parse("").unwrap();
        let default = Config::default();
        assert_eq!(parsed.network.ws_url, default.network.ws_url);
        assert_eq!(parsed.storage.dir, default.storage.dir);
        assert_eq!(parsed.features.report_dir, default.features.report_dir);
    }

    #[test]
    fn rejects_non_finite_backoff_multiplier() {
        for value in ["nan", "inf"] {
            let toml = format!("[reconnection]\nbackoff_multiplier = {value}\n");
            assert!(
                matches!(
                    Config::parse(&toml),
                    Err(Error::Config(ConfigError::InvalidValue {
                        field: "backoff_multiplier",
                        ..
                    }))
                ),
                "{value} should be rejected"
            );
        }
    }
}
