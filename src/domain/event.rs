//! Market data records shared by the feed, the storage layer, and features.
//!
//! These are what get persisted as JSON lines, so field names follow the
//! exchange's camelCase spelling.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::Symbol;
use super::money::{Amount, Price};

/// A single price level. Serialized as a `[price, amount]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Price, Amount)", into = "(Price, Amount)")]
pub struct PriceLevel {
    pub price: Price,
    pub amount: Amount,
}

impl PriceLevel {
    /// Create a new price level
    #[must_use]
    pub const fn new(price: Price, amount: Amount) -> Self {
        Self { price, amount }
    }
}

impl From<(Price, Amount)> for PriceLevel {
    fn from((price, amount): (Price, Amount)) -> Self {
        Self { price, amount }
    }
}

impl From<PriceLevel> for (Price, Amount) {
    fn from(level: PriceLevel) -> Self {
        (level.price, level.amount)
    }
}

/// Aggregated depth snapshot (`market.$symbol.depth.step0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthData {
    pub symbol: Symbol,
    /// Exchange timestamp in milliseconds.
    pub ts: u64,
    pub version: u64,
    /// Best bid first.
    pub bids: Vec<PriceLevel>,
    /// Best ask first.
    pub asks: Vec<PriceLevel>,
}

impl DepthData {
    /// Best bid (highest buy price)
    #[must_use]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    /// Best ask (lowest sell price)
    #[must_use]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }
}

/// Taker side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "buy"),
            TradeDirection::Sell => write!(f, "sell"),
        }
    }
}

/// A single executed trade (`market.$symbol.trade.detail`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeData {
    pub symbol: Symbol,
    pub trade_id: u64,
    /// Trade timestamp in milliseconds.
    pub ts: u64,
    pub price: Price,
    pub amount: Amount,
    pub direction: TradeDirection,
}

/// Whether a book record replaces the book or patches it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookAction {
    Snapshot,
    #[default]
    Update,
}

/// Market-by-price book record (`market.$symbol.mbp.$levels`).
///
/// Updates carry only changed levels; an amount of zero deletes the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookData {
    pub symbol: Symbol,
    #[serde(skip)]
    pub action: BookAction,
    pub seq_num: u64,
    /// Absent on snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_seq_num: Option<u64>,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderBookData {
    /// Build a full-book snapshot record.
    #[must_use]
    pub fn snapshot(
        symbol: Symbol,
        seq_num: u64,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    ) -> Self {
        Self {
            symbol,
            action: BookAction::Snapshot,
            seq_num,
            prev_seq_num: None,
            bids,
            asks,
        }
    }

    /// Build an incremental update record.
    #[must_use]
    pub fn update(
        symbol: Symbol,
        seq_num: u64,
        prev_seq_num: u64,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    ) -> Self {
        Self {
            symbol,
            action: BookAction::Update,
            seq_num,
            prev_seq_num: Some(prev_seq_num),
            bids,
            asks,
        }
    }

    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.action == BookAction::Snapshot
    }
}
