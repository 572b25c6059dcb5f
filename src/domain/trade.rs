//! Bounded history of recent trades.

use std::collections::VecDeque;

use super::event::TradeData;

/// Default number of trades kept per tape.
pub const DEFAULT_TAPE_CAPACITY: usize = 1000;

/// Fixed-capacity ring of the most recent trades, oldest evicted first.
#[derive(Debug, Clone)]
pub struct TradeTape {
    trades: VecDeque<TradeData>,
    capacity: usize,
}

impl TradeTape {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            trades: VecDeque::with_capacity(capacity.min(DEFAULT_TAPE_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, trade: TradeData) {
        if self.trades.len() == self.capacity {
            self.trades.pop_front();
        }
        self.trades.push_back(trade);
    }

    /// Most recent trade.
    #[must_use]
    pub fn last(&self) -> Option<&TradeData> {
        self.trades.back()
    }

    /// The `n` most recent trades, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &TradeData> {
        self.trades.iter().rev().take(n)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

impl Default for TradeTape {
    fn default() -> Self {
        Self::new(DEFAULT_TAPE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::TradeDirection;
    use crate::domain::id::Symbol;
    use rust_decimal_macros::dec;

    fn trade(id: u64) -> TradeData {
        TradeData {
            symbol: Symbol::new("btcusdt"),
            trade_id: id,
            ts: id,
            price: dec!(100),
            amount: dec!(0.1),
            direction: TradeDirection::Buy,
        }
    }

    #[test]
    fn tape_evicts_oldest_when_full() {
        let mut tape = TradeTape::new(3);
        for id in 1..=5 {
            tape.push(trade(id));
        }

        assert_eq!(tape.len(), 3);
        let ids: Vec<_> = tape.recent(10).map(|t| t.trade_id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn empty_tape_has_no_last_trade() {
        let tape = TradeTape::default();
        assert!(tape.is_empty());
        assert!(tape.last().is_none());
    }
}
