//! Derived market features computed through a dependency graph.
//!
//! # Architecture
//!
//! Each feature implements the [`Feature`] trait. Features without parents
//! react directly to depth data; features with parents react to their
//! parents' values. The [`FeatureGraph`] owns every feature and propagates
//! changes in registration order, which is a topological order because a
//! parent must always be registered before its children.
//!
//! # Example
//!
//! ```ignore
//! use openbook::feature::registry::build_graph;
//!
//! let mut graph = build_graph(&["mid_price".to_string()])?;
//! if graph.on_depth(&depth) {
//!     println!("{:?}", graph.reported());
//! }
//! ```

pub mod features;
mod graph;
pub mod registry;
pub mod report;

pub use features::{BestAskFeature, BestBidFeature, MidPriceFeature};
pub use graph::{FeatureGraph, FeatureId};
pub use report::ReportWriter;

use rust_decimal::Decimal;

use crate::domain::DepthData;

/// A scalar derived from market data.
pub trait Feature: Send {
    /// Unique identifier, used in configuration and report headers.
    fn name(&self) -> &'static str;

    /// Current value, `None` until enough input has been seen.
    fn value(&self) -> Option<Decimal>;

    /// React to new depth data. Return `true` if this feature must be updated.
    ///
    /// Only called on features without parents.
    fn on_depth(&mut self, _depth: &DepthData) -> bool {
        false
    }

    /// React to a parent's new value. `slot` is the slot the edge was
    /// registered with. Return `true` if this feature must be updated.
    fn on_parent_update(&mut self, _slot: usize, _value: Option<Decimal>) -> bool {
        false
    }

    /// Recompute the value after a triggering callback returned `true`.
    fn update(&mut self) {}
}
