use serde::Deserialize;
use std::collections::HashMap;

/// One row of the `/coins/markets` response.
#[derive(Debug, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct GlobalResponse {
    pub data: GlobalData,
}

/// Payload of the `/global` endpoint. Every field may be missing.
#[derive(Debug, Default, Deserialize)]
pub struct GlobalData {
    #[serde(default)]
    pub total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_percentage: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_change_percentage_24h_usd: Option<f64>,
}
