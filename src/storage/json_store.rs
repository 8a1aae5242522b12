use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info};
use tokio::sync::watch;

use crate::data::PortfolioEntry;
use crate::services::{PortfolioStore, upsert_entry};

/// Portfolio store persisted as a JSON array of entries.
pub struct JsonPortfolioStore {
    path: PathBuf,
    entries: watch::Sender<Vec<PortfolioEntry>>,
}

impl JsonPortfolioStore {
    /// Opens the store, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading portfolio file {}", path.display()))?;
            let mut entries = Vec::new();
            let stored: Vec<PortfolioEntry> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing portfolio file {}", path.display()))?;
            for entry in stored {
                upsert_entry(&mut entries, &entry.coin_id, entry.amount);
            }
            entries
        } else {
            Vec::new()
        };

        info!("loaded {} portfolio entries from {}", entries.len(), path.display());

        Ok(Self {
            path,
            entries: watch::Sender::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &[PortfolioEntry]) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("writing portfolio file {}", self.path.display()))?;
        debug!("persisted {} portfolio entries", entries.len());
        Ok(())
    }
}

impl PortfolioStore for JsonPortfolioStore {
    fn entries(&self) -> watch::Receiver<Vec<PortfolioEntry>> {
        self.entries.subscribe()
    }

    fn update_entry(&self, coin_id: &str, amount: f64) -> anyhow::Result<()> {
        let mut updated = self.entries.borrow().clone();
        upsert_entry(&mut updated, coin_id, amount);
        self.persist(&updated)?;
        self.entries.send_replace(updated);
        Ok(())
    }
}
