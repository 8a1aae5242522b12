/// How the coin lists are ordered.
///
/// `Holdings` and `HoldingsReversed` only change the portfolio ordering; the
/// general list falls back to rank order under both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortOption {
    Rank,
    RankReversed,
    #[default]
    Holdings,
    HoldingsReversed,
    Price,
    PriceReversed,
}

impl SortOption {
    pub const ALL: [SortOption; 6] = [
        SortOption::Rank,
        SortOption::RankReversed,
        SortOption::Holdings,
        SortOption::HoldingsReversed,
        SortOption::Price,
        SortOption::PriceReversed,
    ];

    /// Selecting the rank column again flips its direction.
    pub fn toggled_rank(self) -> Self {
        match self {
            SortOption::Rank => SortOption::RankReversed,
            _ => SortOption::Rank,
        }
    }

    pub fn toggled_holdings(self) -> Self {
        match self {
            SortOption::Holdings => SortOption::HoldingsReversed,
            _ => SortOption::Holdings,
        }
    }

    pub fn toggled_price(self) -> Self {
        match self {
            SortOption::Price => SortOption::PriceReversed,
            _ => SortOption::Price,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Rank => "Rank ▲",
            SortOption::RankReversed => "Rank ▼",
            SortOption::Holdings => "Holdings ▼",
            SortOption::HoldingsReversed => "Holdings ▲",
            SortOption::Price => "Price ▼",
            SortOption::PriceReversed => "Price ▲",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_flip_same_column_and_reset_other_columns() {
        assert_eq!(SortOption::Rank.toggled_rank(), SortOption::RankReversed);
        assert_eq!(SortOption::RankReversed.toggled_rank(), SortOption::Rank);
        assert_eq!(SortOption::Price.toggled_rank(), SortOption::Rank);
        assert_eq!(SortOption::Holdings.toggled_holdings(), SortOption::HoldingsReversed);
        assert_eq!(SortOption::Rank.toggled_holdings(), SortOption::Holdings);
        assert_eq!(SortOption::Price.toggled_price(), SortOption::PriceReversed);
        assert_eq!(SortOption::HoldingsReversed.toggled_price(), SortOption::Price);
    }

    #[test]
    fn default_is_holdings() {
        assert_eq!(SortOption::default(), SortOption::Holdings);
    }
}
