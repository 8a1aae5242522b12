//! Crypto market dashboard.
//!
//! Combines a live coin list, search text, sort preference, portfolio
//! holdings and global market figures into three views: the filtered coin
//! list, the portfolio and the statistics header.

pub mod app;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod request;
pub mod services;
pub mod storage;
pub mod third_party;
pub mod ui;

pub use data::{Coin, MarketSnapshot, PortfolioEntry, SortOption, Statistic};
pub use pipeline::{AggregationPipeline, AggregationState, Collaborators, PipelineHandle};
