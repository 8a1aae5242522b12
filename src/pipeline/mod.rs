pub mod aggregation;
pub mod filter;
pub mod holdings;
pub mod sorter;
pub mod statistics;

pub use aggregation::{AggregationPipeline, AggregationState, Collaborators, Output, PipelineHandle};
pub use filter::filter_coins;
pub use holdings::map_holdings;
pub use sorter::{sort_coins, sort_portfolio};
pub use statistics::{compute_statistics, portfolio_change};
