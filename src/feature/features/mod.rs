//! Built-in features.

mod best_ask;
mod best_bid;
mod mid_price;

pub use best_ask::BestAskFeature;
pub use best_bid::BestBidFeature;
pub use mid_price::MidPriceFeature;
