pub mod coin_data;
pub mod format;
pub mod market;
pub mod sort_option;

pub use coin_data::{Coin, PortfolioEntry};
pub use market::{MarketSnapshot, Statistic};
pub use sort_option::SortOption;
