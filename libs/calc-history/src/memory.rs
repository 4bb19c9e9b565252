//! In-memory bulk history log
//!
//! Owned by one calcsrv instance and injected into its handlers; there is no
//! process-wide singleton.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::log::{page, HistoryLog, HistoryPage};
use crate::record::{insert_sorted, HistoryRecord, SERVER_HISTORY_CAP};
use crate::stats::HistoryStats;

#[derive(Debug)]
pub struct MemoryHistoryLog {
    records: RwLock<Vec<HistoryRecord>>,
    capacity: usize,
}

impl Default for MemoryHistoryLog {
    fn default() -> Self {
        Self::new(SERVER_HISTORY_CAP)
    }
}

impl MemoryHistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl HistoryLog for MemoryHistoryLog {
    async fn list(&self, limit: usize, offset: usize) -> Result<HistoryPage> {
        Ok(page(&self.records.read(), limit, offset))
    }

    async fn add(&self, record: HistoryRecord) -> Result<HistoryRecord> {
        let mut records = self.records.write();
        insert_sorted(&mut records, record.clone(), self.capacity);
        debug!("History record {} stored ({} total)", record.id, records.len());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() != before)
    }

    async fn clear(&self) -> Result<usize> {
        let mut records = self.records.write();
        let removed = records.len();
        records.clear();
        Ok(removed)
    }

    async fn stats(&self) -> Result<HistoryStats> {
        Ok(HistoryStats::compute(&self.records.read(), Utc::now()))
    }
}
