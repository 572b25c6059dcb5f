use rust_decimal::Decimal;

use crate::domain::Price;
use crate::feature::Feature;

/// Midpoint between best ask and best bid.
///
/// Parents: best ask on [`ASK_SLOT`](Self::ASK_SLOT), best bid on
/// [`BID_SLOT`](Self::BID_SLOT).
#[derive(Debug, Default)]
pub struct MidPriceFeature {
    ask: Option<Price>,
    bid: Option<Price>,
    value: Option<Price>,
}

impl MidPriceFeature {
    pub const NAME: &'static str = "mid_price";
    pub const ASK_SLOT: usize = 0;
    pub const BID_SLOT: usize = 1;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Feature for MidPriceFeature {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn value(&self) -> Option<Decimal> {
        self.value
    }

    fn on_parent_update(&mut self, slot: usize, value: Option<Decimal>) -> bool {
        match slot {
            Self::ASK_SLOT => self.ask = value,
            Self::BID_SLOT => self.bid = value,
            _ => return false,
        }
        true
    }

    fn update(&mut self) {
        self.value = match (self.ask, self.bid) {
            (Some(ask), Some(bid)) => Some((ask + bid) / Decimal::TWO),
            _ => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn needs_both_sides() {
        let mut feature = MidPriceFeature::new();

        assert!(feature.on_parent_update(MidPriceFeature::ASK_SLOT, Some(dec!(101))));
        feature.update();
        assert_eq!(feature.value(), None);

        assert!(feature.on_parent_update(MidPriceFeature::BID_SLOT, Some(dec!(100))));
        feature.update();
        assert_eq!(feature.value(), Some(dec!(100.5)));
    }

    #[test]
    fn unknown_slot_is_ignored() {
        let mut feature = MidPriceFeature::new();
        assert!(!feature.on_parent_update(7, Some(dec!(1))));
    }
}
