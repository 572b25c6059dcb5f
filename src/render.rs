//! Terminal ladder view of an order book.

use std::fmt;

use owo_colors::OwoColorize;
use tabled::{Table, Tabled};

use crate::domain::{Amount, OrderBook, Price, PriceLevel, DUST_AMOUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Ask,
    Bid,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ask => write!(f, "ask"),
            Self::Bid => write!(f, "bid"),
        }
    }
}

/// One ladder line. `total` is the amount resting at this price or better.
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct LadderRow {
    #[tabled(rename = "Side")]
    pub side: Side,
    #[tabled(rename = "Price")]
    pub price: Price,
    #[tabled(rename = "Amount")]
    pub amount: Amount,
    #[tabled(rename = "Total")]
    pub total: Amount,
}

/// Up to `depth` non-dust levels per side: asks with the highest price on
/// top, then bids best first.
#[must_use]
pub fn ladder_rows(book: &OrderBook, depth: usize) -> Vec<LadderRow> {
    let mut asks = cumulative(Side::Ask, book.asks(), depth);
    asks.reverse();
    let bids = cumulative(Side::Bid, book.bids(), depth);
    asks.extend(bids);
    asks
}

fn cumulative(side: Side, levels: impl Iterator<Item = PriceLevel>, depth: usize) -> Vec<LadderRow> {
    let mut total = Amount::ZERO;
    levels
        .filter(|level| level.amount >= DUST_AMOUNT)
        .take(depth)
        .map(|level| {
            total += level.amount;
            LadderRow {
                side,
                price: level.price,
                amount: level.amount,
                total,
            }
        })
        .collect()
}

/// Render the ladder as a table, asks in red and bids in green.
#[must_use]
pub fn render_ladder(book: &OrderBook, depth: usize) -> String {
    let rows = ladder_rows(book, depth);
    let seq = book
        .seq_num()
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    let header = format!("{}  seq {}", book.symbol().bold(), seq.dimmed());

    if rows.is_empty() {
        return format!("{header}\n  (empty book)");
    }

    let table = Table::new(&rows).to_string();
    let mut out = header;
    for line in table.lines() {
        out.push('\n');
        if line.contains(" ask ") {
            out.push_str(&line.red().to_string());
        } else if line.contains(" bid ") {
            out.push_str(&line.green().to_string());
        } else {
            out.push_str(line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderBookData, Symbol};
    use rust_decimal_macros::dec;

    fn book() -> OrderBook {
        let mut book = OrderBook::new(Symbol::new("btcusdt"));
        book.apply_snapshot(&OrderBookData::snapshot(
            Symbol::new("btcusdt"),
            1,
            vec![
                PriceLevel::new(dec!(100), dec!(1)),
                PriceLevel::new(dec!(99), dec!(0.00001)),
                PriceLevel::new(dec!(98), dec!(2)),
            ],
            vec![
                PriceLevel::new(dec!(101), dec!(1.5)),
                PriceLevel::new(dec!(102), dec!(0.5)),
                PriceLevel::new(dec!(103), dec!(4)),
            ],
        ));
        book
    }

    #[test]
    fn asks_descend_into_bids() {
        let rows = ladder_rows(&book(), 2);
        let prices: Vec<_> = rows.iter().map(|r| (r.side, r.price, r.total)).collect();

        assert_eq!(
            prices,
            vec![
                (Side::Ask, dec!(102), dec!(2.0)),
                (Side::Ask, dec!(101), dec!(1.5)),
                (Side::Bid, dec!(100), dec!(1)),
                (Side::Bid, dec!(98), dec!(3)),
            ]
        );
    }

    #[test]
    fn render_contains_every_price() {
        let out = render_ladder(&book(), 10);
        for price in ["103", "102", "101", "100", "98"] {
            assert!(out.contains(price), "missing {price} in\n{out}");
        }
        assert!(!out.contains("0.00001"));
    }

    #[test]
    fn empty_book_renders_placeholder() {
        let book = OrderBook::new(Symbol::new("ethusdt"));
        assert!(render_ladder(&book, 5).contains("(empty book)"));
    }
}
