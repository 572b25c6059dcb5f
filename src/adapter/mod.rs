//! Exchange adapters.

pub mod huobi;
