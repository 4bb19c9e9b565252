//! History log capability
//!
//! Implemented by the in-memory bulk log served by calcsrv, the blob-backed local
//! log and the HTTP client for a remote calcsrv.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::HistoryRecord;
use crate::stats::HistoryStats;

/// One page of a newest-first listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub records: Vec<HistoryRecord>,
    /// Number of records in the whole log
    pub total: usize,
}

#[async_trait]
pub trait HistoryLog: Send + Sync {
    /// Newest-first page starting at `offset`
    async fn list(&self, limit: usize, offset: usize) -> Result<HistoryPage>;

    /// Store a record, keeping its id and timestamp
    async fn add(&self, record: HistoryRecord) -> Result<HistoryRecord>;

    /// Remove a record; `false` when no record had this id
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Remove everything, returning how many records were dropped
    async fn clear(&self) -> Result<usize>;

    async fn stats(&self) -> Result<HistoryStats>;
}

/// Newest-first page out of an already sorted snapshot
pub(crate) fn page(records: &[HistoryRecord], limit: usize, offset: usize) -> HistoryPage {
    HistoryPage {
        records: records.iter().skip(offset).take(limit).cloned().collect(),
        total: records.len(),
    }
}
