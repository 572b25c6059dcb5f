//! Instrument identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Exchange symbol such as `btcusdt`.
///
/// Huobi topics are case-sensitive and always lowercase, so the symbol is
/// normalized on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Create a new `Symbol`, lowercasing the input.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into().to_ascii_lowercase())
    }

    /// Get the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_lowercased() {
        assert_eq!(Symbol::new("BTCUSDT").as_str(), "btcusdt");
    }

    #[test]
    fn symbol_deserializes_through_normalization() {
        let symbol: Symbol = serde_json::from_str(r#""EthUsdt""#).unwrap();
        assert_eq!(symbol, Symbol::from("ethusdt"));
        assert_eq!(serde_json::to_string(&symbol).unwrap(), r#""ethusdt""#);
    }
}
