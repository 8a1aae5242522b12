use crate::data::{Coin, MarketSnapshot};
use crate::third_party::coingecko::{
    api_path::{COINGECKO_GLOBAL_API, COINGECKO_MARKETS_API},
    data::*,
};
use itertools::Itertools;
use reqwest::Client;

pub async fn fetch_market_coins(client: &Client) -> anyhow::Result<Vec<Coin>> {
    let response = client
        .get(COINGECKO_MARKETS_API)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_market_coins(&response)
}

pub async fn fetch_global_market(client: &Client) -> anyhow::Result<MarketSnapshot> {
    let response = client
        .get(COINGECKO_GLOBAL_API)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_global_market(&response)
}

/// Parses a `/coins/markets` body, dropping repeated ids.
pub fn parse_market_coins(body: &str) -> anyhow::Result<Vec<Coin>> {
    let parse_json: Vec<MarketCoin> = serde_json::from_str(body)?;
    let coins = parse_json
        .into_iter()
        .unique_by(|c| c.id.clone())
        .map(Coin::from)
        .collect();
    Ok(coins)
}

pub fn parse_global_market(body: &str) -> anyhow::Result<MarketSnapshot> {
    let parse_json: GlobalResponse = serde_json::from_str(body)?;
    Ok(MarketSnapshot::from(parse_json.data))
}
