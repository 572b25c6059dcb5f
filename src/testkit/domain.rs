//! Builders for domain primitives used across tests.

use rust_decimal::Decimal;

use crate::domain::{DepthData, OrderBookData, PriceLevel, Symbol, TradeData, TradeDirection};
use crate::exchange::MarketEvent;

/// Price levels from `(price, amount)` pairs.
pub fn levels(pairs: &[(Decimal, Decimal)]) -> Vec<PriceLevel> {
    pairs.iter().map(|&(p, a)| PriceLevel::new(p, a)).collect()
}

/// A one-level depth event.
pub fn depth_event(symbol: &str, ts: u64, bid: Decimal, ask: Decimal) -> MarketEvent {
    MarketEvent::Depth(DepthData {
        symbol: Symbol::new(symbol),
        ts,
        version: ts,
        bids: vec![PriceLevel::new(bid, Decimal::ONE)],
        asks: vec![PriceLevel::new(ask, Decimal::ONE)],
    })
}

pub fn trade_event(symbol: &str, trade_id: u64, price: Decimal) -> MarketEvent {
    MarketEvent::Trade(TradeData {
        symbol: Symbol::new(symbol),
        trade_id,
        ts: trade_id,
        price,
        amount: Decimal::ONE,
        direction: TradeDirection::Buy,
    })
}

/// MBP update with `prev_seq_num = seq_num - 1`.
pub fn update_event(
    symbol: &str,
    seq_num: u64,
    bids: &[(Decimal, Decimal)],
    asks: &[(Decimal, Decimal)],
) -> MarketEvent {
    MarketEvent::BookUpdate(OrderBookData::update(
        Symbol::new(symbol),
        seq_num,
        seq_num.saturating_sub(1),
        levels(bids),
        levels(asks),
    ))
}

pub fn snapshot_event(
    symbol: &str,
    seq_num: u64,
    bids: &[(Decimal, Decimal)],
    asks: &[(Decimal, Decimal)],
) -> MarketEvent {
    MarketEvent::BookSnapshot(OrderBookData::snapshot(
        Symbol::new(symbol),
        seq_num,
        levels(bids),
        levels(asks),
    ))
}

pub fn disconnect_event(reason: &str) -> MarketEvent {
    MarketEvent::Disconnected {
        reason: reason.to_string(),
    }
}
