//! Openbook - Huobi market-data collector.
//!
//! Streams depth, trades, and incremental market-by-price books from Huobi,
//! keeps a sequence-checked local order book per symbol, derives features
//! through a dependency graph, and persists every event as JSON lines with
//! periodic upload to S3.
//!
//! # Architecture
//!
//! - **`exchange`** - Exchange abstraction: [`exchange::MarketDataStream`],
//!   topics, and a reconnecting wrapper
//! - **`adapter::huobi`** - Huobi WebSocket implementation (gzip frames,
//!   ping/pong, `sub`/`req`)
//! - **`domain`** - Exchange-agnostic data: price levels, order book,
//!   snapshot/update synchronization, trade tape
//! - **`feature`** - Feature graph (`best_ask`, `best_bid`, `mid_price`) and
//!   CSV reports
//! - **`storage`** - JSON-lines files and object store uploads
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`error`] - Error types for the crate
//! - [`app`] - Feed tasks and the dispatch loop
//! - [`render`] - Terminal ladder view
//!
//! # Features
//!
//! - `testkit` - Expose mock streams and builders for integration tests
//!
//! # Example
//!
//! ```no_run
//! use openbook::feature::registry::build_graph;
//!
//! let graph = build_graph(&["mid_price".to_string()]).unwrap();
//! assert_eq!(graph.reported_names(), vec!["mid_price"]);
//! ```

pub mod adapter;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod exchange;
pub mod feature;
pub mod render;
pub mod storage;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
