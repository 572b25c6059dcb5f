//! Exchange subscription topics.
//!
//! Topics use Huobi's channel naming and round-trip through
//! [`Display`](fmt::Display) and [`FromStr`], so the `ch` field of an incoming
//! tick can be mapped back to what was subscribed.

use std::fmt;
use std::str::FromStr;

use crate::domain::Symbol;
use crate::error::Error;

/// A market data channel for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Aggregated depth, `market.$symbol.depth.step0`.
    Depth { symbol: Symbol },
    /// Trade detail, `market.$symbol.trade.detail`.
    Trade { symbol: Symbol },
    /// Incremental market-by-price book, `market.$symbol.mbp.$levels`.
    Mbp { symbol: Symbol, levels: u16 },
}

impl Topic {
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        match self {
            Self::Depth { symbol } | Self::Trade { symbol } | Self::Mbp { symbol, .. } => symbol,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Depth { symbol } => write!(f, "market.{symbol}.depth.step0"),
            Self::Trade { symbol } => write!(f, "market.{symbol}.trade.detail"),
            Self::Mbp { symbol, levels } => write!(f, "market.{symbol}.mbp.{levels}"),
        }
    }
}

impl FromStr for Topic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            ["market", symbol, "depth", "step0"] if !symbol.is_empty() => Ok(Self::Depth {
                symbol: Symbol::new(*symbol),
            }),
            ["market", symbol, "trade", "detail"] if !symbol.is_empty() => Ok(Self::Trade {
                symbol: Symbol::new(*symbol),
            }),
            ["market", symbol, "mbp", levels] if !symbol.is_empty() => {
                let levels = levels
                    .parse()
                    .map_err(|_| Error::Parse(format!("invalid mbp levels in topic '{s}'")))?;
                Ok(Self::Mbp {
                    symbol: Symbol::new(*symbol),
                    levels,
                })
            }
            _ => Err(Error::Parse(format!("unrecognized topic '{s}'"))),
        }
    }
}
