use crate::data::Coin;

/// Keeps the coins whose name, symbol or id contains `search_text`,
/// ignoring case. Blank search text keeps everything in its original order.
pub fn filter_coins(search_text: &str, coins: &[Coin]) -> Vec<Coin> {
    let needle = search_text.trim().to_lowercase();
    if needle.is_empty() {
        return coins.to_vec();
    }

    coins
        .iter()
        .filter(|coin| {
            coin.name.to_lowercase().contains(&needle)
                || coin.symbol.to_lowercase().contains(&needle)
                || coin.id.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coins() -> Vec<Coin> {
        vec![
            Coin::new("bitcoin", "Bitcoin", "btc").with_rank(1),
            Coin::new("ethereum", "Ethereum", "eth").with_rank(2),
            Coin::new("wrapped-bitcoin", "Wrapped Bitcoin", "wbtc").with_rank(15),
        ]
    }

    #[test]
    fn blank_text_is_identity() {
        assert_eq!(filter_coins("", &coins()), coins());
        assert_eq!(filter_coins("   ", &coins()), coins());
    }

    #[test]
    fn matches_symbol_case_insensitively() {
        let filtered = filter_coins("BT", &coins());
        let ids: Vec<&str> = filtered.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["bitcoin", "wrapped-bitcoin"]);
    }

    #[test]
    fn matches_id_and_name() {
        assert_eq!(filter_coins("wrapped-", &coins()).len(), 1);
        assert_eq!(filter_coins("ether", &coins())[0].id, "ethereum");
    }

    #[test]
    fn no_match_gives_empty_list() {
        assert!(filter_coins("doge", &coins()).is_empty());
    }
}
