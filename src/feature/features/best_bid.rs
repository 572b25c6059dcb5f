use rust_decimal::Decimal;

use crate::domain::{DepthData, Price};
use crate::feature::Feature;

/// Highest bid of the latest depth snapshot.
#[derive(Debug, Default)]
pub struct BestBidFeature {
    value: Option<Price>,
    pending: Option<Price>,
}

impl BestBidFeature {
    pub const NAME: &'static str = "best_bid";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Feature for BestBidFeature {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn value(&self) -> Option<Decimal> {
        self.value
    }

    fn on_depth(&mut self, depth: &DepthData) -> bool {
        self.pending = depth.best_bid();
        self.pending != self.value
    }

    fn update(&mut self) {
        self.value = self.pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PriceLevel, Symbol};
    use rust_decimal_macros::dec;

    #[test]
    fn tracks_highest_bid() {
        let mut feature = BestBidFeature::new();
        let depth = DepthData {
            symbol: Symbol::new("btcusdt"),
            ts: 1,
            version: 1,
            bids: vec![
                PriceLevel::new(dec!(99), dec!(1)),
                PriceLevel::new(dec!(98), dec!(2)),
            ],
            asks: vec![],
        };

        assert!(feature.on_depth(&depth));
        feature.update();
        assert_eq!(feature.value(), Some(dec!(99)));
        assert!(!feature.on_depth(&depth));
    }
}
