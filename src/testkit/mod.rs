//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`stream`]: Mock [`MarketDataStream`](crate::exchange::MarketDataStream)
//!   implementation: `ScriptedStream`.
//! - [`domain`]: Builders for depth, trade, and book events.
//! - [`config`]: Canonical test configurations.

pub mod config;
pub mod domain;
pub mod stream;
