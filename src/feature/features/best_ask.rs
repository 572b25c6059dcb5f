use rust_decimal::Decimal;

use crate::domain::{DepthData, Price};
use crate::feature::Feature;

/// Lowest ask of the latest depth snapshot.
#[derive(Debug, Default)]
pub struct BestAskFeature {
    value: Option<Price>,
    pending: Option<Price>,
}

impl BestAskFeature {
    pub const NAME: &'static str = "best_ask";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Feature for BestAskFeature {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn value(&self) -> Option<Decimal> {
        self.value
    }

    fn on_depth(&mut self, depth: &DepthData) -> bool {
        self.pending = depth.best_ask();
        self.pending != self.value
    }

    fn update(&mut self) {
        self.value = self.pending;
    }
}
