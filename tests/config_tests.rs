use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use openbook::config::Config;
use openbook::domain::Symbol;
use openbook::error::{ConfigError, Error};

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn write_temp_config(contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let suffix = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!("openbook-config-test-{nanos}-{suffix}.toml"));
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn config_loads_full_file() {
    let toml = r#"
symbols = ["BTCUSDT", "ethusdt"]

[network]
ws_url = "wss://api-aws.huobi.pro/ws"
feed_url = "wss://api-aws.huobi.pro/feed"

[book]
levels = 20

[logging]
level = "debug"
format = "json"

[storage]
dir = "/tmp/openbook"
max_rows = 10
upload_interval_secs = 60

[storage.s3]
enabled = true
bucket = "market-archive"
region = "ap-northeast-1"

[features]
enabled = ["mid_price"]
report_dir = "/tmp/openbook/reports"
"#;

    let path = write_temp_config(toml);
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    let config = result.expect("valid config");
    assert_eq!(config.symbols, vec![Symbol::new("btcusdt"), Symbol::new("ethusdt")]);
    assert_eq!(config.network.feed_url, "wss://api-aws.huobi.pro/feed");
    assert_eq!(config.book.levels, 20);
    assert_eq!(config.storage.max_rows, 10);
    assert!(config.storage.s3.enabled);
    assert_eq!(config.storage.s3.region, "ap-northeast-1");
    assert_eq!(config.features.enabled, vec!["mid_price".to_string()]);
}

#[test]
fn config_rejects_unsupported_levels() {
    let path = write_temp_config("[book]\nlevels = 50\n");
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    match result {
        Err(Error::Config(ConfigError::InvalidValue { field: "levels", .. })) => {}
        Err(err) => panic!("Expected invalid levels error, got {err}"),
        Ok(config) => panic!("Expected levels {} to be rejected", config.book.levels),
    }
}

#[test]
fn config_rejects_http_feed_url() {
    let toml = r#"
[network]
feed_url = "https://api.huobi.pro/feed"
"#;
    let path = write_temp_config(toml);
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "feed_url",
            ..
        }))
    ));
}

#[test]
fn config_rejects_empty_symbols() {
    let path = write_temp_config("symbols = []\n");
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField { field: "symbols" }))
    ));
}

#[test]
fn config_requires_bucket_when_upload_enabled() {
    let toml = r#"
[storage.s3]
enabled = true
bucket = ""
"#;
    let path = write_temp_config(toml);
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField { field: "bucket" }))
    ));
}

#[test]
fn config_rejects_shrinking_backoff() {
    let toml = r#"
[reconnection]
backoff_multiplier = 0.5
"#;
    let path = write_temp_config(toml);
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "backoff_multiplier",
            ..
        }))
    ));
}

#[test]
fn missing_file_is_read_error() {
    let result = Config::load("/definitely/not/here/openbook.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn malformed_toml_is_parse_error() {
    let path = write_temp_config("symbols = [\n");
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}
