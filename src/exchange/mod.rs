//! Exchange abstraction layer.
//!
//! A [`MarketDataStream`] delivers [`MarketEvent`]s for a set of subscribed
//! [`Topic`]s. [`ReconnectingDataStream`] wraps any stream with backoff,
//! circuit breaking, and resubscription.

mod reconnecting;
mod topic;

pub use reconnecting::ReconnectingDataStream;
pub use topic::Topic;

use async_trait::async_trait;

use crate::domain::{DepthData, OrderBookData, Symbol, TradeData};
use crate::error::Result;

/// Events produced by a market data stream.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    /// Aggregated depth snapshot.
    Depth(DepthData),
    /// A single trade.
    Trade(TradeData),
    /// Incremental MBP update.
    BookUpdate(OrderBookData),
    /// Full MBP snapshot, in answer to a snapshot request.
    BookSnapshot(OrderBookData),
    /// The connection dropped.
    Disconnected { reason: String },
    /// A dropped connection was re-established and topics resubscribed.
    /// Requests in flight on the old connection are lost.
    Reconnected,
}

impl MarketEvent {
    /// Symbol the event refers to, if any.
    #[must_use]
    pub const fn symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Depth(d) => Some(&d.symbol),
            Self::Trade(t) => Some(&t.symbol),
            Self::BookUpdate(b) | Self::BookSnapshot(b) => Some(&b.symbol),
            Self::Disconnected { .. } | Self::Reconnected => None,
        }
    }
}

/// Streaming market data source.
#[async_trait]
pub trait MarketDataStream: Send {
    /// Open the underlying connection.
    async fn connect(&mut self) -> Result<()>;

    /// Subscribe to the given topics.
    async fn subscribe(&mut self, topics: &[Topic]) -> Result<()>;

    /// Ask for a full snapshot of `topic`; the answer arrives through
    /// [`next_event`](Self::next_event) as [`MarketEvent::BookSnapshot`].
    async fn request_snapshot(&mut self, topic: &Topic) -> Result<()>;

    /// Next event, or `None` when the stream has ended.
    async fn next_event(&mut self) -> Option<MarketEvent>;

    /// Exchange name for logging.
    fn exchange_name(&self) -> &'static str;
}
