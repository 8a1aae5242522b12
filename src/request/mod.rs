pub mod client;
pub mod source;

pub use client::{fetch_global_market, fetch_market_coins};
pub use source::{HttpCoinSource, HttpMarketSource};
