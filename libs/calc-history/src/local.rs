//! Local history log: the whole snapshot as one JSON blob

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::blob::BlobStore;
use crate::error::Result;
use crate::log::{page, HistoryLog, HistoryPage};
use crate::record::{insert_sorted, HistoryRecord, SESSION_HISTORY_CAP};
use crate::stats::HistoryStats;

/// Blob key the snapshot is stored under
pub const HISTORY_KEY: &str = "calculator-history";

#[derive(Clone)]
pub struct LocalHistoryLog {
    store: Arc<dyn BlobStore>,
    key: String,
    capacity: usize,
}

impl LocalHistoryLog {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            key: HISTORY_KEY.to_string(),
            capacity: SESSION_HISTORY_CAP,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Read the persisted snapshot; an absent blob is an empty history
    pub fn load(&self) -> Result<Vec<HistoryRecord>> {
        match self.store.get(&self.key)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the persisted snapshot
    pub fn replace(&self, records: &[HistoryRecord]) -> Result<()> {
        let bytes = serde_json::to_vec(records)?;
        self.store.put(&self.key, &bytes)?;
        debug!("Persisted {} history records locally", records.len());
        Ok(())
    }
}

#[async_trait]
impl HistoryLog for LocalHistoryLog {
    async fn list(&self, limit: usize, offset: usize) -> Result<HistoryPage> {
        Ok(page(&self.load()?, limit, offset))
    }

    async fn add(&self, record: HistoryRecord) -> Result<HistoryRecord> {
        let mut records = self.load()?;
        insert_sorted(&mut records, record.clone(), self.capacity);
        self.replace(&records)?;
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.replace(&records)?;
        Ok(true)
    }

    async fn clear(&self) -> Result<usize> {
        let removed = self.load()?.len();
        self.replace(&[])?;
        Ok(removed)
    }

    async fn stats(&self) -> Result<HistoryStats> {
        Ok(HistoryStats::compute(&self.load()?, Utc::now()))
    }
}
