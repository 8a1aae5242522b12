//! Collaborators the aggregation pipeline reacts to.
//!
//! Each source exposes its latest value through a `watch` channel: a new
//! emission replaces the previous one instead of queueing behind it.

pub mod memory;

use tokio::sync::watch;

use crate::data::{Coin, MarketSnapshot, PortfolioEntry};

pub use memory::{MemoryCoinSource, MemoryMarketSource, MemoryPortfolioStore, RecordingFeedback};

/// Delivers the full coin list.
pub trait CoinSource: Send + Sync {
    fn coins(&self) -> watch::Receiver<Vec<Coin>>;

    /// Starts a re-fetch. Results arrive later on the `coins` channel; a
    /// failed fetch emits nothing.
    fn reload(&self);
}

/// Delivers global market figures, `None` until the first successful fetch.
pub trait MarketSource: Send + Sync {
    fn market(&self) -> watch::Receiver<Option<MarketSnapshot>>;

    fn reload(&self);
}

/// Persists the user's holdings and emits the full entry set on every change.
pub trait PortfolioStore: Send + Sync {
    fn entries(&self) -> watch::Receiver<Vec<PortfolioEntry>>;

    /// Inserts or replaces the entry for `coin_id`. An amount of zero or less
    /// removes it.
    fn update_entry(&self, coin_id: &str, amount: f64) -> anyhow::Result<()>;
}

/// Fire-and-forget acknowledgement of a manual reload.
pub trait FeedbackSink: Send + Sync {
    fn notify_success(&self);
}

/// Applies one upsert to an entry list, keeping at most one entry per coin.
pub(crate) fn upsert_entry(entries: &mut Vec<PortfolioEntry>, coin_id: &str, amount: f64) {
    if amount <= 0.0 {
        entries.retain(|entry| entry.coin_id != coin_id);
        return;
    }

    match entries.iter_mut().find(|entry| entry.coin_id == coin_id) {
        Some(entry) => entry.amount = amount,
        None => entries.push(PortfolioEntry::new(coin_id, amount)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_existing_amount_in_place() {
        let mut entries = vec![PortfolioEntry::new("bitcoin", 1.0), PortfolioEntry::new("ethereum", 2.0)];
        upsert_entry(&mut entries, "bitcoin", 3.0);

        assert_eq!(entries, vec![PortfolioEntry::new("bitcoin", 3.0), PortfolioEntry::new("ethereum", 2.0)]);
    }

    #[test]
    fn upsert_appends_new_coin() {
        let mut entries = vec![PortfolioEntry::new("bitcoin", 1.0)];
        upsert_entry(&mut entries, "solana", 5.0);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], PortfolioEntry::new("solana", 5.0));
    }

    #[test]
    fn zero_amount_removes_entry() {
        let mut entries = vec![PortfolioEntry::new("bitcoin", 1.0)];
        upsert_entry(&mut entries, "bitcoin", 0.0);
        assert!(entries.is_empty());

        upsert_entry(&mut entries, "dogecoin", 0.0);
        assert!(entries.is_empty());
    }
}
