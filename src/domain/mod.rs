//! Exchange-agnostic market data types and book maintenance.

pub mod error;
pub mod event;
pub mod id;
pub mod money;
pub mod order_book;
pub mod sync;
pub mod trade;

pub use error::DomainError;
pub use event::{BookAction, DepthData, OrderBookData, PriceLevel, TradeData, TradeDirection};
pub use id::Symbol;
pub use money::{Amount, Price, DUST_AMOUNT};
pub use order_book::OrderBook;
pub use sync::{BookSync, SnapshotOutcome, SyncAction};
pub use trade::TradeTape;
