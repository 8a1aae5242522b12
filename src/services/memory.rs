use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use tokio::sync::watch;

use crate::data::{Coin, MarketSnapshot, PortfolioEntry};
use crate::services::{CoinSource, FeedbackSink, MarketSource, PortfolioStore, upsert_entry};

/// Coin source whose list is pushed by the owner. Used offline and in tests.
pub struct MemoryCoinSource {
    coins: watch::Sender<Vec<Coin>>,
    reloads: AtomicUsize,
}

impl MemoryCoinSource {
    pub fn new(initial: Vec<Coin>) -> Self {
        Self {
            coins: watch::Sender::new(initial),
            reloads: AtomicUsize::new(0),
        }
    }

    pub fn publish(&self, coins: Vec<Coin>) {
        self.coins.send_replace(coins);
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.coins.receiver_count()
    }
}

impl CoinSource for MemoryCoinSource {
    fn coins(&self) -> watch::Receiver<Vec<Coin>> {
        self.coins.subscribe()
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        debug!("memory coin source reload requested");
    }
}

pub struct MemoryMarketSource {
    market: watch::Sender<Option<MarketSnapshot>>,
    reloads: AtomicUsize,
}

impl MemoryMarketSource {
    pub fn new(initial: Option<MarketSnapshot>) -> Self {
        Self {
            market: watch::Sender::new(initial),
            reloads: AtomicUsize::new(0),
        }
    }

    pub fn publish(&self, snapshot: MarketSnapshot) {
        self.market.send_replace(Some(snapshot));
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.market.receiver_count()
    }
}

impl MarketSource for MemoryMarketSource {
    fn market(&self) -> watch::Receiver<Option<MarketSnapshot>> {
        self.market.subscribe()
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        debug!("memory market source reload requested");
    }
}

/// Portfolio store kept only in memory.
pub struct MemoryPortfolioStore {
    entries: watch::Sender<Vec<PortfolioEntry>>,
}

impl MemoryPortfolioStore {
    pub fn new(initial: Vec<PortfolioEntry>) -> Self {
        Self {
            entries: watch::Sender::new(initial),
        }
    }

    pub fn snapshot(&self) -> Vec<PortfolioEntry> {
        self.entries.borrow().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.entries.receiver_count()
    }
}

impl PortfolioStore for MemoryPortfolioStore {
    fn entries(&self) -> watch::Receiver<Vec<PortfolioEntry>> {
        self.entries.subscribe()
    }

    fn update_entry(&self, coin_id: &str, amount: f64) -> anyhow::Result<()> {
        self.entries.send_modify(|entries| upsert_entry(entries, coin_id, amount));
        Ok(())
    }
}

/// Counts reload acknowledgements.
#[derive(Default)]
pub struct RecordingFeedback {
    successes: AtomicUsize,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }
}

impl FeedbackSink for RecordingFeedback {
    fn notify_success(&self) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_emits_every_mutation() {
        let store = MemoryPortfolioStore::new(Vec::new());
        let mut rx = store.entries();

        store.update_entry("bitcoin", 1.5).unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), vec![PortfolioEntry::new("bitcoin", 1.5)]);
    }

    #[test]
    fn sources_count_reloads() {
        let coins = MemoryCoinSource::new(Vec::new());
        let market = MemoryMarketSource::new(None);

        coins.reload();
        coins.reload();
        market.reload();

        assert_eq!(coins.reload_count(), 2);
        assert_eq!(market.reload_count(), 1);
    }
}
