//! Huobi spot market data adapter.

pub mod codec;
pub mod message;
mod stream;

pub use stream::HuobiDataStream;

use crate::domain::Symbol;
use crate::exchange::Topic;

/// Depth and trade topics for each symbol, served on the market endpoint.
#[must_use]
pub fn market_topics(symbols: &[Symbol]) -> Vec<Topic> {
    symbols
        .iter()
        .flat_map(|symbol| {
            [
                Topic::Depth {
                    symbol: symbol.clone(),
                },
                Topic::Trade {
                    symbol: symbol.clone(),
                },
            ]
        })
        .collect()
}

/// MBP topics for each symbol, served on the feed endpoint.
#[must_use]
pub fn book_topics(symbols: &[Symbol], levels: u16) -> Vec<Topic> {
    symbols
        .iter()
        .map(|symbol| Topic::Mbp {
            symbol: symbol.clone(),
            levels,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_topics_pair_depth_and_trades() {
        let topics = market_topics(&[Symbol::new("btcusdt"), Symbol::new("ethusdt")]);
        let names: Vec<_> = topics.iter().map(ToString::to_string).collect();

        assert_eq!(
            names,
            vec![
                "market.btcusdt.depth.step0",
                "market.btcusdt.trade.detail",
                "market.ethusdt.depth.step0",
                "market.ethusdt.trade.detail",
            ]
        );
    }

    #[test]
    fn book_topics_use_configured_levels() {
        let topics = book_topics(&[Symbol::new("btcusdt")], 400);
        assert_eq!(topics[0].to_string(), "market.btcusdt.mbp.400");
    }
}
