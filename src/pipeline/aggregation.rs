//! Orchestrates the pipeline stages.
//!
//! [`AggregationState`] holds the latest value of every input and output and
//! runs each cascade synchronously. [`AggregationPipeline`] drives it from a
//! single tokio task, reacting to source emissions and user commands one at a
//! time, and republishes the outputs on `watch` channels.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Sleep};

use crate::config::SEARCH_DEBOUNCE_MS;
use crate::data::{Coin, MarketSnapshot, PortfolioEntry, SortOption, Statistic};
use crate::pipeline::filter::filter_coins;
use crate::pipeline::holdings::map_holdings;
use crate::pipeline::sorter::{sort_coins, sort_portfolio};
use crate::pipeline::statistics::compute_statistics;
use crate::services::{CoinSource, FeedbackSink, MarketSource, PortfolioStore};

/// An output recomputed by a cascade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    AllCoins,
    PortfolioCoins,
    Statistics,
}

#[derive(Debug, Default)]
pub struct AggregationState {
    search_text: String,
    sort_option: SortOption,
    raw_coins: Option<Vec<Coin>>,
    portfolio_entries: Option<Vec<PortfolioEntry>>,
    market_snapshot: Option<MarketSnapshot>,
    all_coins: Option<Vec<Coin>>,
    portfolio_coins: Option<Vec<Coin>>,
    statistics: Vec<Statistic>,
    is_loading: bool,
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_search_text(&mut self, text: impl Into<String>) -> Vec<Output> {
        self.search_text = text.into();
        self.run_from_all_coins()
    }

    pub fn apply_sort_option(&mut self, option: SortOption) -> Vec<Output> {
        self.sort_option = option;
        self.run_from_all_coins()
    }

    pub fn apply_raw_coins(&mut self, coins: Vec<Coin>) -> Vec<Output> {
        self.raw_coins = Some(coins);
        self.run_from_all_coins()
    }

    pub fn apply_portfolio_entries(&mut self, entries: Vec<PortfolioEntry>) -> Vec<Output> {
        self.portfolio_entries = Some(entries);
        let mut emitted = Vec::new();
        self.recompute_portfolio_coins(&mut emitted);
        emitted
    }

    pub fn apply_market_snapshot(&mut self, snapshot: Option<MarketSnapshot>) -> Vec<Output> {
        self.market_snapshot = snapshot;
        let mut emitted = Vec::new();
        self.recompute_statistics(&mut emitted);
        emitted
    }

    /// Marks a reload as in flight. Cleared by the next statistics recompute.
    pub fn begin_loading(&mut self) {
        self.is_loading = true;
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn sort_option(&self) -> SortOption {
        self.sort_option
    }

    pub fn all_coins(&self) -> &[Coin] {
        self.all_coins.as_deref().unwrap_or_default()
    }

    pub fn portfolio_coins(&self) -> &[Coin] {
        self.portfolio_coins.as_deref().unwrap_or_default()
    }

    pub fn statistics(&self) -> &[Statistic] {
        &self.statistics
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    fn run_from_all_coins(&mut self) -> Vec<Output> {
        let mut emitted = Vec::new();
        self.recompute_all_coins(&mut emitted);
        emitted
    }

    fn recompute_all_coins(&mut self, emitted: &mut Vec<Output>) {
        let Some(raw_coins) = &self.raw_coins else {
            return;
        };

        let filtered = filter_coins(&self.search_text, raw_coins);
        self.all_coins = Some(sort_coins(self.sort_option, filtered));
        emitted.push(Output::AllCoins);

        self.recompute_portfolio_coins(emitted);
    }

    fn recompute_portfolio_coins(&mut self, emitted: &mut Vec<Output>) {
        let (Some(all_coins), Some(entries)) = (&self.all_coins, &self.portfolio_entries) else {
            return;
        };

        let held = map_holdings(all_coins, entries);
        self.portfolio_coins = Some(sort_portfolio(self.sort_option, held));
        emitted.push(Output::PortfolioCoins);

        self.recompute_statistics(emitted);
    }

    fn recompute_statistics(&mut self, emitted: &mut Vec<Output>) {
        let Some(portfolio_coins) = &self.portfolio_coins else {
            return;
        };

        self.statistics = compute_statistics(self.market_snapshot.as_ref(), portfolio_coins);
        self.is_loading = false;
        emitted.push(Output::Statistics);
    }
}

/// The external collaborators a pipeline subscribes to.
#[derive(Clone)]
pub struct Collaborators {
    pub coins: Arc<dyn CoinSource>,
    pub market: Arc<dyn MarketSource>,
    pub portfolio: Arc<dyn PortfolioStore>,
    pub feedback: Arc<dyn FeedbackSink>,
}

#[derive(Debug)]
enum Command {
    SearchText(String),
    SortOption(SortOption),
    Reload,
    SetHolding { coin_id: String, amount: f64 },
}

/// Control and output side of a running pipeline.
///
/// The pipeline task stops once every clone of the handle is dropped.
#[derive(Clone)]
pub struct PipelineHandle {
    commands: mpsc::UnboundedSender<Command>,
    all_coins: watch::Receiver<Vec<Coin>>,
    portfolio_coins: watch::Receiver<Vec<Coin>>,
    statistics: watch::Receiver<Vec<Statistic>>,
    is_loading: watch::Receiver<bool>,
}

impl PipelineHandle {
    /// Queues new search text. It is applied once no further text has
    /// arrived for the debounce delay.
    pub fn set_search_text(&self, text: impl Into<String>) {
        self.send(Command::SearchText(text.into()));
    }

    pub fn set_sort_option(&self, option: SortOption) {
        self.send(Command::SortOption(option));
    }

    /// Raises the loading flag and asks the coin and market sources to
    /// re-fetch.
    pub fn reload(&self) {
        self.send(Command::Reload);
    }

    /// Forwards a holding change to the portfolio store. The portfolio list
    /// follows once the store emits.
    pub fn set_holding(&self, coin_id: impl Into<String>, amount: f64) {
        self.send(Command::SetHolding {
            coin_id: coin_id.into(),
            amount,
        });
    }

    pub fn all_coins(&self) -> watch::Receiver<Vec<Coin>> {
        self.all_coins.clone()
    }

    pub fn portfolio_coins(&self) -> watch::Receiver<Vec<Coin>> {
        self.portfolio_coins.clone()
    }

    pub fn statistics(&self) -> watch::Receiver<Vec<Statistic>> {
        self.statistics.clone()
    }

    pub fn is_loading(&self) -> watch::Receiver<bool> {
        self.is_loading.clone()
    }

    fn send(&self, command: Command) {
        if let Err(e) = self.commands.send(command) {
            debug!("pipeline stopped, dropping {:?}", e.0);
        }
    }
}

struct Outputs {
    all_coins: watch::Sender<Vec<Coin>>,
    portfolio_coins: watch::Sender<Vec<Coin>>,
    statistics: watch::Sender<Vec<Statistic>>,
    is_loading: watch::Sender<bool>,
}

pub struct AggregationPipeline {
    state: AggregationState,
    collaborators: Collaborators,
    commands: mpsc::UnboundedReceiver<Command>,
    outputs: Outputs,
    debounce: Duration,
}

impl AggregationPipeline {
    /// Spawns the pipeline task with the default search debounce.
    pub fn spawn(collaborators: Collaborators) -> (PipelineHandle, JoinHandle<()>) {
        Self::spawn_with_debounce(collaborators, Duration::from_millis(SEARCH_DEBOUNCE_MS))
    }

    pub fn spawn_with_debounce(
        collaborators: Collaborators,
        debounce: Duration,
    ) -> (PipelineHandle, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (all_coins_tx, all_coins_rx) = watch::channel(Vec::new());
        let (portfolio_tx, portfolio_rx) = watch::channel(Vec::new());
        let (statistics_tx, statistics_rx) = watch::channel(Vec::new());
        let (loading_tx, loading_rx) = watch::channel(false);

        let handle = PipelineHandle {
            commands: commands_tx,
            all_coins: all_coins_rx,
            portfolio_coins: portfolio_rx,
            statistics: statistics_rx,
            is_loading: loading_rx,
        };

        let pipeline = Self {
            state: AggregationState::new(),
            collaborators,
            commands: commands_rx,
            outputs: Outputs {
                all_coins: all_coins_tx,
                portfolio_coins: portfolio_tx,
                statistics: statistics_tx,
                is_loading: loading_tx,
            },
            debounce,
        };

        let task = tokio::spawn(pipeline.run());
        (handle, task)
    }

    async fn run(mut self) {
        let mut coins_rx = self.collaborators.coins.coins();
        let mut entries_rx = self.collaborators.portfolio.entries();
        let mut market_rx = self.collaborators.market.market();

        // The sources already hold a value; treat it as their first emission.
        let coins = coins_rx.borrow_and_update().clone();
        let emitted = self.state.apply_raw_coins(coins);
        self.publish(&emitted);
        let entries = entries_rx.borrow_and_update().clone();
        let emitted = self.state.apply_portfolio_entries(entries);
        self.publish(&emitted);
        let snapshot = market_rx.borrow_and_update().clone();
        let emitted = self.state.apply_market_snapshot(snapshot);
        self.publish(&emitted);

        info!("aggregation pipeline started");

        let debounce = time::sleep(Duration::ZERO);
        tokio::pin!(debounce);
        let mut pending_search: Option<String> = None;
        let mut coins_open = true;
        let mut entries_open = true;
        let mut market_open = true;

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command, &mut pending_search, debounce.as_mut()),
                    None => break,
                },

                () = &mut debounce, if pending_search.is_some() => {
                    if let Some(text) = pending_search.take() {
                        debug!("applying search text {:?}", text);
                        let emitted = self.state.apply_search_text(text);
                        self.publish(&emitted);
                    }
                }

                changed = coins_rx.changed(), if coins_open => match changed {
                    Ok(()) => {
                        let coins = coins_rx.borrow_and_update().clone();
                        debug!("coin source emitted {} coins", coins.len());
                        let emitted = self.state.apply_raw_coins(coins);
                        self.publish(&emitted);
                    }
                    Err(_) => {
                        warn!("coin source closed");
                        coins_open = false;
                    }
                },

                changed = entries_rx.changed(), if entries_open => match changed {
                    Ok(()) => {
                        let entries = entries_rx.borrow_and_update().clone();
                        debug!("portfolio store emitted {} entries", entries.len());
                        let emitted = self.state.apply_portfolio_entries(entries);
                        self.publish(&emitted);
                    }
                    Err(_) => {
                        warn!("portfolio store closed");
                        entries_open = false;
                    }
                },

                changed = market_rx.changed(), if market_open => match changed {
                    Ok(()) => {
                        let snapshot = market_rx.borrow_and_update().clone();
                        debug!("market source emitted, present: {}", snapshot.is_some());
                        let emitted = self.state.apply_market_snapshot(snapshot);
                        self.publish(&emitted);
                    }
                    Err(_) => {
                        warn!("market source closed");
                        market_open = false;
                    }
                },
            }
        }

        info!("aggregation pipeline stopped");
    }

    fn handle_command(
        &mut self,
        command: Command,
        pending_search: &mut Option<String>,
        debounce: Pin<&mut Sleep>,
    ) {
        match command {
            Command::SearchText(text) => {
                *pending_search = Some(text);
                debounce.reset(Instant::now() + self.debounce);
            }
            Command::SortOption(option) => {
                debug!("sort option changed to {:?}", option);
                let emitted = self.state.apply_sort_option(option);
                self.publish(&emitted);
            }
            Command::Reload => {
                info!("manual reload requested");
                self.state.begin_loading();
                self.outputs.is_loading.send_replace(true);
                self.collaborators.coins.reload();
                self.collaborators.market.reload();
                self.collaborators.feedback.notify_success();
            }
            Command::SetHolding { coin_id, amount } => {
                debug!("updating holding {} -> {}", coin_id, amount);
                if let Err(e) = self.collaborators.portfolio.update_entry(&coin_id, amount) {
                    warn!("failed to update holding for {}: {:#}", coin_id, e);
                }
            }
        }
    }

    fn publish(&self, emitted: &[Output]) {
        for output in emitted {
            match output {
                Output::AllCoins => {
                    self.outputs.all_coins.send_replace(self.state.all_coins().to_vec());
                }
                Output::PortfolioCoins => {
                    self.outputs
                        .portfolio_coins
                        .send_replace(self.state.portfolio_coins().to_vec());
                }
                Output::Statistics => {
                    self.outputs.statistics.send_replace(self.state.statistics().to_vec());
                    self.outputs.is_loading.send_replace(self.state.is_loading());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coins() -> Vec<Coin> {
        vec![
            Coin::new("ethereum", "Ethereum", "eth").with_rank(2).with_price(3_000.0).with_change(-2.0),
            Coin::new("bitcoin", "Bitcoin", "btc").with_rank(1).with_price(50_000.0).with_change(10.0),
            Coin::new("solana", "Solana", "sol").with_rank(5).with_price(150.0),
        ]
    }

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot {
            market_cap: "$2.00Tr".to_string(),
            market_cap_change_percentage_24h: 0.5,
            volume_24h: "$80.00Bn".to_string(),
            btc_dominance: "50.00%".to_string(),
        }
    }

    fn ids(coins: &[Coin]) -> Vec<&str> {
        coins.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn nothing_is_emitted_without_raw_coins() {
        let mut state = AggregationState::new();

        assert!(state.apply_search_text("btc").is_empty());
        assert!(state.apply_portfolio_entries(vec![PortfolioEntry::new("bitcoin", 1.0)]).is_empty());
        assert!(state.apply_market_snapshot(Some(snapshot())).is_empty());
        assert!(state.statistics().is_empty());
    }

    #[test]
    fn raw_coins_without_portfolio_only_emit_all_coins() {
        let mut state = AggregationState::new();

        assert_eq!(state.apply_raw_coins(coins()), vec![Output::AllCoins]);
        assert_eq!(ids(state.all_coins()), vec!["bitcoin", "ethereum", "solana"]);
        assert!(state.portfolio_coins().is_empty());
    }

    #[test]
    fn full_cascade_runs_in_dependency_order() {
        let mut state = AggregationState::new();
        state.apply_portfolio_entries(vec![PortfolioEntry::new("bitcoin", 2.0)]);
        state.apply_market_snapshot(Some(snapshot()));

        let emitted = state.apply_raw_coins(coins());

        assert_eq!(emitted, vec![Output::AllCoins, Output::PortfolioCoins, Output::Statistics]);
        assert_eq!(ids(state.portfolio_coins()), vec!["bitcoin"]);
        assert_eq!(state.portfolio_coins()[0].holdings_value(), 100_000.0);
        assert_eq!(state.statistics().len(), 4);
        assert_eq!(state.statistics()[3].display_value, "$100,000.00");
    }

    #[test]
    fn portfolio_change_skips_first_stage() {
        let mut state = AggregationState::new();
        state.apply_raw_coins(coins());

        let emitted = state.apply_portfolio_entries(vec![PortfolioEntry::new("solana", 1.0)]);

        assert_eq!(emitted, vec![Output::PortfolioCoins, Output::Statistics]);
    }

    #[test]
    fn missing_market_snapshot_yields_empty_statistics() {
        let mut state = AggregationState::new();
        state.apply_raw_coins(coins());
        let emitted = state.apply_portfolio_entries(vec![PortfolioEntry::new("bitcoin", 1.0)]);

        assert!(emitted.contains(&Output::Statistics));
        assert!(state.statistics().is_empty());
    }

    #[test]
    fn search_text_filters_portfolio_too() {
        let mut state = AggregationState::new();
        state.apply_raw_coins(coins());
        state.apply_portfolio_entries(vec![
            PortfolioEntry::new("bitcoin", 1.0),
            PortfolioEntry::new("solana", 1.0),
        ]);

        state.apply_search_text("sol");

        assert_eq!(ids(state.all_coins()), vec!["solana"]);
        assert_eq!(ids(state.portfolio_coins()), vec!["solana"]);
    }

    #[test]
    fn sort_option_reorders_both_lists() {
        let mut state = AggregationState::new();
        state.apply_raw_coins(coins());
        state.apply_portfolio_entries(vec![
            PortfolioEntry::new("solana", 100.0),
            PortfolioEntry::new("ethereum", 1.0),
        ]);

        // default holdings ordering: solana 15,000 before ethereum 3,000
        assert_eq!(ids(state.portfolio_coins()), vec!["solana", "ethereum"]);

        state.apply_sort_option(SortOption::Price);
        assert_eq!(ids(state.all_coins()), vec!["bitcoin", "ethereum", "solana"]);
        assert_eq!(ids(state.portfolio_coins()), vec!["ethereum", "solana"]);

        state.apply_sort_option(SortOption::HoldingsReversed);
        assert_eq!(ids(state.portfolio_coins()), vec!["ethereum", "solana"]);
    }

    #[test]
    fn statistics_recompute_clears_loading() {
        let mut state = AggregationState::new();
        state.apply_raw_coins(coins());
        state.apply_portfolio_entries(Vec::new());
        state.begin_loading();
        assert!(state.is_loading());

        state.apply_market_snapshot(Some(snapshot()));

        assert!(!state.is_loading());
    }

    #[test]
    fn loading_stays_set_until_statistics_recompute() {
        let mut state = AggregationState::new();
        state.begin_loading();
        state.apply_raw_coins(coins());

        assert!(state.is_loading());
    }
}
