//! Collateral price feeds.

pub mod price_feed;

pub use price_feed::{Price, PriceSource, StaticPriceSource};
