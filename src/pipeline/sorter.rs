use crate::data::{Coin, SortOption};

/// Orders the general coin list. `Vec::sort_by` is stable, so coins with
/// equal keys keep their input order.
pub fn sort_coins(option: SortOption, mut coins: Vec<Coin>) -> Vec<Coin> {
    match option {
        SortOption::Rank | SortOption::Holdings | SortOption::HoldingsReversed => {
            coins.sort_by(|a, b| a.rank.cmp(&b.rank))
        }
        SortOption::RankReversed => coins.sort_by(|a, b| b.rank.cmp(&a.rank)),
        SortOption::Price => coins.sort_by(|a, b| b.current_price.total_cmp(&a.current_price)),
        SortOption::PriceReversed => {
            coins.sort_by(|a, b| a.current_price.total_cmp(&b.current_price))
        }
    }
    coins
}

/// Orders the portfolio list. Only the holdings options re-sort; every other
/// option keeps the order the coins arrived in.
pub fn sort_portfolio(option: SortOption, mut coins: Vec<Coin>) -> Vec<Coin> {
    match option {
        SortOption::Holdings => {
            coins.sort_by(|a, b| b.holdings_value().total_cmp(&a.holdings_value()))
        }
        SortOption::HoldingsReversed => {
            coins.sort_by(|a, b| a.holdings_value().total_cmp(&b.holdings_value()))
        }
        _ => {}
    }
    coins
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(id: &str, rank: u32, price: f64) -> Coin {
        Coin::new(id, id, id).with_rank(rank).with_price(price)
    }

    fn ids(coins: &[Coin]) -> Vec<&str> {
        coins.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn price_reversed_is_ascending() {
        let coins = vec![priced("a", 1, 100.0), priced("b", 2, 50.0), priced("c", 3, 200.0)];
        let prices: Vec<f64> = sort_coins(SortOption::PriceReversed, coins)
            .iter()
            .map(|c| c.current_price)
            .collect();
        assert_eq!(prices, vec![50.0, 100.0, 200.0]);
    }

    #[test]
    fn holdings_options_fall_back_to_rank_for_general_list() {
        let coins = vec![priced("c", 3, 1.0), priced("a", 1, 3.0), priced("b", 2, 2.0)];
        assert_eq!(ids(&sort_coins(SortOption::Holdings, coins.clone())), vec!["a", "b", "c"]);
        assert_eq!(ids(&sort_coins(SortOption::HoldingsReversed, coins.clone())), vec!["a", "b", "c"]);
        assert_eq!(ids(&sort_coins(SortOption::RankReversed, coins)), vec!["c", "b", "a"]);
    }

    #[test]
    fn price_ties_keep_input_order() {
        let coins = vec![priced("x", 5, 10.0), priced("y", 1, 10.0), priced("z", 2, 20.0)];
        assert_eq!(ids(&sort_coins(SortOption::Price, coins)), vec!["z", "x", "y"]);
    }

    #[test]
    fn portfolio_sorts_by_holdings_value() {
        let coins = vec![
            priced("a", 1, 10.0).with_holdings(1.0),
            priced("b", 2, 10.0).with_holdings(5.0),
            priced("c", 3, 10.0).with_holdings(3.0),
        ];
        assert_eq!(ids(&sort_portfolio(SortOption::Holdings, coins.clone())), vec!["b", "c", "a"]);
        assert_eq!(ids(&sort_portfolio(SortOption::HoldingsReversed, coins.clone())), vec!["a", "c", "b"]);
        assert_eq!(ids(&sort_portfolio(SortOption::PriceReversed, coins)), vec!["a", "b", "c"]);
    }
}
