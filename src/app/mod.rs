//! Application wiring: feed tasks, the dispatch loop, and run modes.

pub mod feed;
mod orchestrator;

pub use orchestrator::App;

use crate::domain::Symbol;

/// What the dispatch loop does beyond collecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Store events and compute features.
    Collect,
    /// Also redraw a ladder of the top `depth` levels of `symbol`.
    Watch { symbol: Symbol, depth: usize },
}

impl Mode {
    fn watched(&self) -> Option<&Symbol> {
        match self {
            Self::Collect => None,
            Self::Watch { symbol, .. } => Some(symbol),
        }
    }
}
