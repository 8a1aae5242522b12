use serde::{Deserialize, Serialize};

use crate::third_party::coingecko::data::MarketCoin;

/// A single coin row as delivered by the coin source.
///
/// Values are replaced wholesale on every upstream emission; setting holdings
/// produces a new `Coin` rather than mutating the existing one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub rank: u32,
    pub current_price: f64,
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_holdings: Option<f64>,
}

impl Coin {
    pub fn new(id: impl Into<String>, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
            rank: 0,
            current_price: 0.0,
            price_change_percentage_24h: None,
            current_holdings: None,
        }
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.current_price = price;
        self
    }

    pub fn with_change(mut self, percentage: f64) -> Self {
        self.price_change_percentage_24h = Some(percentage);
        self
    }

    /// Returns a copy of this coin carrying `amount` as its holdings.
    pub fn with_holdings(&self, amount: f64) -> Self {
        Self {
            current_holdings: Some(amount),
            ..self.clone()
        }
    }

    /// Price times held amount, `0.0` when the coin is not held.
    pub fn holdings_value(&self) -> f64 {
        self.current_holdings
            .map(|amount| amount * self.current_price)
            .unwrap_or(0.0)
    }
}

impl From<MarketCoin> for Coin {
    fn from(raw: MarketCoin) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            symbol: raw.symbol,
            // unranked coins sink to the bottom of the rank ordering
            rank: raw.market_cap_rank.unwrap_or(u32::MAX),
            current_price: raw.current_price.unwrap_or(0.0),
            price_change_percentage_24h: raw.price_change_percentage_24h,
            current_holdings: None,
        }
    }
}

/// A user-declared holding for one coin. At most one entry exists per `coin_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub coin_id: String,
    pub amount: f64,
}

impl PortfolioEntry {
    pub fn new(coin_id: impl Into<String>, amount: f64) -> Self {
        Self {
            coin_id: coin_id.into(),
            amount,
        }
    }
}
