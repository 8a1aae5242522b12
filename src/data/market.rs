use crate::data::format::{format_abbreviated, format_percent};
use crate::third_party::coingecko::data::GlobalData;

/// Global market figures, already formatted for display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarketSnapshot {
    pub market_cap: String,
    pub market_cap_change_percentage_24h: f64,
    pub volume_24h: String,
    pub btc_dominance: String,
}

impl From<GlobalData> for MarketSnapshot {
    fn from(data: GlobalData) -> Self {
        let usd_figure = |figures: &std::collections::HashMap<String, f64>| {
            figures
                .get("usd")
                .map(|value| format!("${}", format_abbreviated(*value)))
                .unwrap_or_default()
        };

        Self {
            market_cap: usd_figure(&data.total_market_cap),
            market_cap_change_percentage_24h: data.market_cap_change_percentage_24h_usd.unwrap_or(0.0),
            volume_24h: usd_figure(&data.total_volume),
            btc_dominance: data
                .market_cap_percentage
                .get("btc")
                .map(|value| format_percent(*value))
                .unwrap_or_default(),
        }
    }
}

/// One tile of the statistics header.
#[derive(Clone, Debug, PartialEq)]
pub struct Statistic {
    pub title: String,
    pub display_value: String,
    pub percentage_change: Option<f64>,
}

impl Statistic {
    pub fn new(title: impl Into<String>, display_value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            display_value: display_value.into(),
            percentage_change: None,
        }
    }

    pub fn with_change(mut self, percentage: f64) -> Self {
        self.percentage_change = Some(percentage);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_from_global_payload() {
        let raw = r#"{
            "total_market_cap": {"usd": 2450000000000.0, "eur": 1.0},
            "total_volume": {"usd": 98700000000.0},
            "market_cap_percentage": {"btc": 52.457, "eth": 17.1},
            "market_cap_change_percentage_24h_usd": -1.25
        }"#;
        let data: GlobalData = serde_json::from_str(raw).unwrap();
        let snapshot = MarketSnapshot::from(data);

        assert_eq!(snapshot.market_cap, "$2.45Tr");
        assert_eq!(snapshot.volume_24h, "$98.70Bn");
        assert_eq!(snapshot.btc_dominance, "52.46%");
        assert_eq!(snapshot.market_cap_change_percentage_24h, -1.25);
    }

    #[test]
    fn snapshot_from_empty_payload_uses_blank_fields() {
        let data: GlobalData = serde_json::from_str("{}").unwrap();
        let snapshot = MarketSnapshot::from(data);

        assert_eq!(snapshot, MarketSnapshot::default());
    }
}
