//! Local market-by-price order book.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::error::DomainError;
use super::event::{OrderBookData, PriceLevel};
use super::id::Symbol;
use super::money::{Amount, Price};

/// Order book for a single symbol, maintained from MBP snapshots and updates.
#[derive(Debug, Clone)]
pub struct OrderBook {
    symbol: Symbol,
    bids: BTreeMap<Reverse<Price>, Amount>,
    asks: BTreeMap<Price, Amount>,
    seq_num: Option<u64>,
}

impl OrderBook {
    /// Create a new empty order book
    #[must_use]
    pub const fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            seq_num: None,
        }
    }

    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Sequence number of the last applied snapshot or update.
    #[must_use]
    pub const fn seq_num(&self) -> Option<u64> {
        self.seq_num
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.seq_num.is_some()
    }

    /// Replace the whole book with a snapshot.
    pub fn apply_snapshot(&mut self, snapshot: &OrderBookData) {
        self.bids.clear();
        self.asks.clear();
        for level in &snapshot.bids {
            if !level.amount.is_zero() {
                self.bids.insert(Reverse(level.price), level.amount);
            }
        }
        for level in &snapshot.asks {
            if !level.amount.is_zero() {
                self.asks.insert(level.price, level.amount);
            }
        }
        self.seq_num = Some(snapshot.seq_num);
    }

    /// Apply an incremental update on top of the current state.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotInitialized`] before the first snapshot and
    /// [`DomainError::SequenceGap`] when `prev_seq_num` does not match the
    /// book's sequence number. The book is left untouched on error.
    pub fn apply_update(&mut self, update: &OrderBookData) -> Result<(), DomainError> {
        let current = self.seq_num.ok_or_else(|| DomainError::NotInitialized {
            symbol: self.symbol.to_string(),
        })?;

        let prev = update.prev_seq_num.unwrap_or(update.seq_num);
        if prev != current {
            return Err(DomainError::SequenceGap {
                expected: current,
                got: prev,
            });
        }

        for level in &update.bids {
            if level.amount.is_zero() {
                self.bids.remove(&Reverse(level.price));
            } else {
                self.bids.insert(Reverse(level.price), level.amount);
            }
        }
        for level in &update.asks {
            if level.amount.is_zero() {
                self.asks.remove(&level.price);
            } else {
                self.asks.insert(level.price, level.amount);
            }
        }
        self.seq_num = Some(update.seq_num);
        Ok(())
    }

    /// Best bid (highest buy price)
    #[must_use]
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids
            .iter()
            .next()
            .map(|(Reverse(price), amount)| PriceLevel::new(*price, *amount))
    }

    /// Best ask (lowest sell price)
    #[must_use]
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks
            .iter()
            .next()
            .map(|(price, amount)| PriceLevel::new(*price, *amount))
    }

    /// Bid levels, best (highest) first.
    pub fn bids(&self) -> impl Iterator<Item = PriceLevel> + '_ {
        self.bids
            .iter()
            .map(|(Reverse(price), amount)| PriceLevel::new(*price, *amount))
    }

    /// Ask levels, best (lowest) first.
    pub fn asks(&self) -> impl Iterator<Item = PriceLevel> + '_ {
        self.asks
            .iter()
            .map(|(price, amount)| PriceLevel::new(*price, *amount))
    }

    /// Up to `depth` levels per side as `(bids, asks)`, best first.
    #[must_use]
    pub fn top(&self, depth: usize) -> (Vec<PriceLevel>, Vec<PriceLevel>) {
        (
            self.bids().take(depth).collect(),
            self.asks().take(depth).collect(),
        )
    }

    #[must_use]
    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    #[must_use]
    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc() -> Symbol {
        Symbol::new("btcusdt")
    }

    fn seeded_book() -> OrderBook {
        let mut book = OrderBook::new(btc());
        book.apply_snapshot(&OrderBookData::snapshot(
            btc(),
            100,
            vec![
                PriceLevel::new(dec!(99), dec!(1)),
                PriceLevel::new(dec!(98), dec!(2)),
            ],
            vec![
                PriceLevel::new(dec!(102), dec!(3)),
                PriceLevel::new(dec!(101), dec!(1.5)),
            ],
        ));
        book
    }

    #[test]
    fn snapshot_sorts_both_sides() {
        let book = seeded_book();

        assert_eq!(book.seq_num(), Some(100));
        assert_eq!(book.best_bid().unwrap().price, dec!(99));
        assert_eq!(book.best_ask().unwrap().price, dec!(101));

        let asks: Vec<_> = book.asks().map(|l| l.price).collect();
        assert_eq!(asks, vec![dec!(101), dec!(102)]);
        let bids: Vec<_> = book.bids().map(|l| l.price).collect();
        assert_eq!(bids, vec![dec!(99), dec!(98)]);
    }

    #[test]
    fn update_upserts_and_deletes_levels() {
        let mut book = seeded_book();
        let update = OrderBookData::update(
            btc(),
            101,
            100,
            vec![
                PriceLevel::new(dec!(99), dec!(0)),
                PriceLevel::new(dec!(99.5), dec!(4)),
            ],
            vec![PriceLevel::new(dec!(101), dec!(2.5))],
        );

        book.apply_update(&update).unwrap();

        assert_eq!(book.seq_num(), Some(101));
        assert_eq!(book.best_bid(), Some(PriceLevel::new(dec!(99.5), dec!(4))));
        assert_eq!(book.best_ask(), Some(PriceLevel::new(dec!(101), dec!(2.5))));
        assert_eq!(book.bid_depth(), 2);
    }

    #[test]
    fn update_with_gap_is_rejected_without_mutation() {
        let mut book = seeded_book();
        let update = OrderBookData::update(
            btc(),
            105,
            104,
            vec![PriceLevel::new(dec!(99), dec!(0))],
            vec![],
        );

        let err = book.apply_update(&update).unwrap_err();

        assert_eq!(
            err,
            DomainError::SequenceGap {
                expected: 100,
                got: 104
            }
        );
        assert_eq!(book.seq_num(), Some(100));
        assert_eq!(book.best_bid().unwrap().price, dec!(99));
    }

    #[test]
    fn update_before_snapshot_is_rejected() {
        let mut book = OrderBook::new(btc());
        let update = OrderBookData::update(btc(), 2, 1, vec![], vec![]);

        assert!(matches!(
            book.apply_update(&update),
            Err(DomainError::NotInitialized { .. })
        ));
    }

    #[test]
    fn top_limits_each_side() {
        let book = seeded_book();
        let (bids, asks) = book.top(1);

        assert_eq!(bids.len(), 1);
        assert_eq!(asks.len(), 1);
        assert_eq!(asks[0].price, dec!(101));
    }

    #[test]
    fn zero_amount_levels_in_snapshot_are_dropped() {
        let mut book = OrderBook::new(btc());
        book.apply_snapshot(&OrderBookData::snapshot(
            btc(),
            1,
            vec![PriceLevel::new(dec!(10), dec!(0))],
            vec![],
        ));

        assert!(book.best_bid().is_none());
        assert!(book.is_initialized());
    }
}
