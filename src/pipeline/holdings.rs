use std::collections::HashMap;

use crate::data::{Coin, PortfolioEntry};

/// Joins `coins` with the portfolio, keeping only held coins.
///
/// The result follows the order of `coins`. If several entries name the same
/// coin the first one wins.
pub fn map_holdings(coins: &[Coin], entries: &[PortfolioEntry]) -> Vec<Coin> {
    let mut amounts: HashMap<&str, f64> = HashMap::with_capacity(entries.len());
    for entry in entries {
        amounts.entry(entry.coin_id.as_str()).or_insert(entry.amount);
    }

    coins
        .iter()
        .filter_map(|coin| {
            amounts
                .get(coin.id.as_str())
                .map(|amount| coin.with_holdings(*amount))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coins() -> Vec<Coin> {
        vec![
            Coin::new("bitcoin", "Bitcoin", "btc").with_rank(1).with_price(50_000.0),
            Coin::new("ethereum", "Ethereum", "eth").with_rank(2).with_price(3_000.0),
            Coin::new("solana", "Solana", "sol").with_rank(5).with_price(150.0),
        ]
    }

    #[test]
    fn keeps_only_held_coins_in_coin_order() {
        let entries = vec![PortfolioEntry::new("solana", 10.0), PortfolioEntry::new("bitcoin", 2.0)];
        let held = map_holdings(&coins(), &entries);

        assert_eq!(held.len(), 2);
        assert_eq!(held[0].id, "bitcoin");
        assert_eq!(held[0].current_holdings, Some(2.0));
        assert_eq!(held[0].holdings_value(), 100_000.0);
        assert_eq!(held[1].id, "solana");
        assert_eq!(held[1].current_holdings, Some(10.0));
    }

    #[test]
    fn entries_for_unknown_coins_are_ignored() {
        let entries = vec![PortfolioEntry::new("dogecoin", 1000.0)];
        assert!(map_holdings(&coins(), &entries).is_empty());
    }

    #[test]
    fn first_duplicate_entry_wins() {
        let entries = vec![PortfolioEntry::new("ethereum", 1.0), PortfolioEntry::new("ethereum", 4.0)];
        let held = map_holdings(&coins(), &entries);

        assert_eq!(held.len(), 1);
        assert_eq!(held[0].current_holdings, Some(1.0));
    }

    #[test]
    fn empty_portfolio_maps_to_nothing() {
        assert!(map_holdings(&coins(), &[]).is_empty());
    }
}
