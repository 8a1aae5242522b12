use crate::data::format::format_currency_2dp;
use crate::data::{Coin, MarketSnapshot, Statistic};

pub const MARKET_CAP_TITLE: &str = "Market Cap";
pub const VOLUME_TITLE: &str = "24h Volume";
pub const BTC_DOMINANCE_TITLE: &str = "BTC Dominance";
pub const PORTFOLIO_VALUE_TITLE: &str = "Portfolio Value";

/// Builds the four header statistics: market cap, 24h volume, BTC dominance
/// and portfolio value, in that order. Without a market snapshot there are no
/// statistics at all.
pub fn compute_statistics(snapshot: Option<&MarketSnapshot>, portfolio: &[Coin]) -> Vec<Statistic> {
    let Some(snapshot) = snapshot else {
        return Vec::new();
    };

    let portfolio_value: f64 = portfolio.iter().map(Coin::holdings_value).sum();

    vec![
        Statistic::new(MARKET_CAP_TITLE, snapshot.market_cap.clone())
            .with_change(snapshot.market_cap_change_percentage_24h),
        Statistic::new(VOLUME_TITLE, snapshot.volume_24h.clone()),
        Statistic::new(BTC_DOMINANCE_TITLE, snapshot.btc_dominance.clone()),
        Statistic::new(PORTFOLIO_VALUE_TITLE, format_currency_2dp(portfolio_value))
            .with_change(portfolio_change(portfolio)),
    ]
}

/// Percentage change of the portfolio value over the last 24 hours.
///
/// A zero previous total (empty portfolio, or nothing held at a non-zero
/// price) reports `0.0`.
pub fn portfolio_change(portfolio: &[Coin]) -> f64 {
    let current_total: f64 = portfolio.iter().map(Coin::holdings_value).sum();
    let previous_total: f64 = portfolio.iter().map(previous_value).sum();

    if previous_total == 0.0 {
        return 0.0;
    }

    let change = (current_total - previous_total) / previous_total * 100.0;
    if change.is_finite() { change } else { 0.0 }
}

/// Holdings value 24 hours ago, derived from today's value and the price
/// change. A -100% move leaves no baseline, so the current value stands in.
fn previous_value(coin: &Coin) -> f64 {
    let current = coin.holdings_value();
    let divisor = 1.0 + coin.price_change_percentage_24h.unwrap_or(0.0) / 100.0;
    if divisor == 0.0 {
        current
    } else {
        current / divisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot {
            market_cap: "$2.45Tr".to_string(),
            market_cap_change_percentage_24h: 1.5,
            volume_24h: "$98.70Bn".to_string(),
            btc_dominance: "52.46%".to_string(),
        }
    }

    fn bitcoin() -> Coin {
        Coin::new("btc", "Bitcoin", "btc")
            .with_rank(1)
            .with_price(50_000.0)
            .with_change(10.0)
    }

    #[test]
    fn no_snapshot_means_no_statistics() {
        assert!(compute_statistics(None, &[bitcoin().with_holdings(1.0)]).is_empty());
    }

    #[test]
    fn statistics_come_in_fixed_order() {
        let stats = compute_statistics(Some(&snapshot()), &[]);
        let titles: Vec<&str> = stats.iter().map(|s| s.title.as_str()).collect();

        assert_eq!(
            titles,
            vec![MARKET_CAP_TITLE, VOLUME_TITLE, BTC_DOMINANCE_TITLE, PORTFOLIO_VALUE_TITLE]
        );
        assert_eq!(stats[0].display_value, "$2.45Tr");
        assert_eq!(stats[0].percentage_change, Some(1.5));
        assert_eq!(stats[1].percentage_change, None);
        assert_eq!(stats[2].display_value, "52.46%");
    }

    #[test]
    fn portfolio_value_and_change() {
        let stats = compute_statistics(Some(&snapshot()), &[bitcoin().with_holdings(2.0)]);
        let portfolio = &stats[3];

        assert_eq!(portfolio.display_value, "$100,000.00");
        let change = portfolio.percentage_change.unwrap();
        assert!((change - 10.0).abs() < 1e-9, "change was {change}");
    }

    #[test]
    fn empty_portfolio_reports_zero_change() {
        let stats = compute_statistics(Some(&snapshot()), &[]);

        assert_eq!(stats[3].display_value, "$0.00");
        assert_eq!(stats[3].percentage_change, Some(0.0));
    }

    #[test]
    fn missing_price_change_means_flat() {
        let coin = Coin::new("eth", "Ethereum", "eth").with_price(3_000.0).with_holdings(1.0);
        assert_eq!(portfolio_change(&[coin]), 0.0);
    }

    #[test]
    fn total_wipeout_does_not_produce_nan() {
        let coin = Coin::new("luna", "Luna", "luna")
            .with_price(0.0)
            .with_change(-100.0)
            .with_holdings(1_000.0);
        let change = portfolio_change(&[coin]);
        assert!(change.is_finite());
        assert_eq!(change, 0.0);
    }

    #[test]
    fn mixed_portfolio_change() {
        // 100 now (was 50) plus 100 now (was 200): 200 now vs 250 before
        let up = Coin::new("a", "A", "a").with_price(100.0).with_change(100.0).with_holdings(1.0);
        let down = Coin::new("b", "B", "b").with_price(100.0).with_change(-50.0).with_holdings(1.0);
        let change = portfolio_change(&[up, down]);
        assert!((change + 20.0).abs() < 1e-9, "change was {change}");
    }
}
