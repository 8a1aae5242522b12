use std::sync::Arc;

use log::{info, warn};
use reqwest::Client;
use tokio::sync::watch;

use crate::config::HTTP_USER_AGENT;
use crate::data::{Coin, MarketSnapshot};
use crate::request::client::{fetch_global_market, fetch_market_coins};
use crate::services::{CoinSource, MarketSource};

fn build_client() -> reqwest::Result<Client> {
    Client::builder().user_agent(HTTP_USER_AGENT).build()
}

/// Coin list fetched from CoinGecko. Starts empty until the first reload.
pub struct HttpCoinSource {
    client: Client,
    coins: Arc<watch::Sender<Vec<Coin>>>,
}

impl HttpCoinSource {
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client()?,
            coins: Arc::new(watch::Sender::new(Vec::new())),
        })
    }
}

impl CoinSource for HttpCoinSource {
    fn coins(&self) -> watch::Receiver<Vec<Coin>> {
        self.coins.subscribe()
    }

    fn reload(&self) {
        let client = self.client.clone();
        let coins = Arc::clone(&self.coins);
        tokio::spawn(async move {
            match fetch_market_coins(&client).await {
                Ok(list) => {
                    info!("fetched {} coins", list.len());
                    coins.send_replace(list);
                }
                Err(e) => warn!("failed to fetch coins: {:#}", e),
            }
        });
    }
}

pub struct HttpMarketSource {
    client: Client,
    market: Arc<watch::Sender<Option<MarketSnapshot>>>,
}

impl HttpMarketSource {
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client()?,
            market: Arc::new(watch::Sender::new(None)),
        })
    }
}

impl MarketSource for HttpMarketSource {
    fn market(&self) -> watch::Receiver<Option<MarketSnapshot>> {
        self.market.subscribe()
    }

    fn reload(&self) {
        let client = self.client.clone();
        let market = Arc::clone(&self.market);
        tokio::spawn(async move {
            match fetch_global_market(&client).await {
                Ok(snapshot) => {
                    info!("fetched global market data");
                    market.send_replace(Some(snapshot));
                }
                Err(e) => warn!("failed to fetch global market data: {:#}", e),
            }
        });
    }
}
