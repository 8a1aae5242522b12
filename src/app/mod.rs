use crate::config::{DEFAULT_PORTFOLIO_FILE, OFFLINE_ENV};
use crate::data::{Coin, MarketSnapshot};
use crate::pipeline::{AggregationPipeline, Collaborators};
use crate::request::{HttpCoinSource, HttpMarketSource};
use crate::services::{CoinSource, MarketSource, MemoryCoinSource, MemoryMarketSource};
use crate::storage::JsonPortfolioStore;
use crate::ui::{TuiApp, UiFeedback};
use color_eyre::{Result, eyre::eyre};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct App {
    portfolio_path: PathBuf,
    offline: bool,
}

impl App {
    pub fn new(portfolio_path: impl Into<PathBuf>, offline: bool) -> Self {
        Self {
            portfolio_path: portfolio_path.into(),
            offline,
        }
    }

    /// Portfolio path from the first argument, offline mode from the
    /// environment.
    pub fn from_env() -> Self {
        let portfolio_path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_PORTFOLIO_FILE.to_string());
        let offline = std::env::var(OFFLINE_ENV).is_ok_and(|v| v == "1");
        Self::new(portfolio_path, offline)
    }

    fn sources(&self) -> Result<(Arc<dyn CoinSource>, Arc<dyn MarketSource>)> {
        if self.offline {
            info!("running offline with sample data");
            let coins: Arc<dyn CoinSource> = Arc::new(MemoryCoinSource::new(sample_coins()));
            let market: Arc<dyn MarketSource> =
                Arc::new(MemoryMarketSource::new(Some(sample_market())));
            return Ok((coins, market));
        }

        let coins: Arc<dyn CoinSource> = Arc::new(HttpCoinSource::new()?);
        let market: Arc<dyn MarketSource> = Arc::new(HttpMarketSource::new()?);
        // initial fetch, no reload notice
        coins.reload();
        market.reload();
        Ok((coins, market))
    }

    pub async fn run(&self) -> Result<()> {
        let (feedback_tx, feedback_rx) = mpsc::unbounded_channel::<()>();

        let (coins, market) = self.sources()?;
        let portfolio = Arc::new(
            JsonPortfolioStore::open(&self.portfolio_path).map_err(|e| eyre!("{:#}", e))?,
        );
        info!("portfolio file: {}", portfolio.path().display());

        let collaborators = Collaborators {
            coins,
            market,
            portfolio,
            feedback: Arc::new(UiFeedback::new(feedback_tx)),
        };
        let (handle, pipeline_task) = AggregationPipeline::spawn(collaborators);

        // The UI loop blocks on terminal events, keep it off the async workers
        let ui_task = tokio::task::spawn_blocking(move || {
            let terminal = ratatui::init();
            let app = TuiApp::new(handle, feedback_rx);
            let app_result = app.run(terminal);
            ratatui::restore();
            app_result
        });

        // Wait for UI to finish (user quits)
        let ui_result = ui_task.await?;

        // The UI owned the last handle, so the pipeline winds down on its own
        if let Err(e) = pipeline_task.await {
            warn!("pipeline task ended abnormally: {}", e);
        }

        ui_result
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(DEFAULT_PORTFOLIO_FILE, false)
    }
}

fn sample_coins() -> Vec<Coin> {
    vec![
        Coin::new("bitcoin", "Bitcoin", "btc").with_rank(1).with_price(64_250.0).with_change(2.4),
        Coin::new("ethereum", "Ethereum", "eth").with_rank(2).with_price(3_120.5).with_change(-1.1),
        Coin::new("tether", "Tether", "usdt").with_rank(3).with_price(1.0).with_change(0.01),
        Coin::new("solana", "Solana", "sol").with_rank(5).with_price(148.2).with_change(5.6),
        Coin::new("dogecoin", "Dogecoin", "doge").with_rank(9).with_price(0.1234).with_change(-3.2),
    ]
}

fn sample_market() -> MarketSnapshot {
    MarketSnapshot {
        market_cap: "$2.41Tr".to_string(),
        market_cap_change_percentage_24h: 1.2,
        volume_24h: "$86.30Bn".to_string(),
        btc_dominance: "53.10%".to_string(),
    }
}
