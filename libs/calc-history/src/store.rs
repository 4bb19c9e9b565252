//! HistoryStore - reconciled view over a local log and an optional remote log
//!
//! Local first, remote best effort:
//! - every mutation is applied to the in-memory snapshot and persisted locally
//!   before the remote is contacted
//! - remote faults never roll back a local change; they come back as
//!   [`SyncWarning`]s for the caller to show
//! - a remote merge whose fetch started before the latest local mutation is
//!   dropped, so a concurrent clear or delete is never undone by a slow load

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::{HistoryError, Result};
use crate::local::LocalHistoryLog;
use crate::log::HistoryLog;
use crate::record::{insert_sorted, merge, HistoryRecord, SESSION_HISTORY_CAP};
use crate::stats::HistoryStats;

/// Non-fatal remote synchronization failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncWarning {
    #[error("Failed to load remote history: {0}")]
    Load(String),
    #[error("Failed to sync record to remote history: {0}")]
    Append(String),
    #[error("Failed to clear remote history: {0}")]
    Clear(String),
    #[error("Failed to delete record from remote history: {0}")]
    Delete(String),
}

pub struct HistoryStore {
    snapshot: RwLock<Vec<HistoryRecord>>,
    local: LocalHistoryLog,
    remote: Option<Arc<dyn HistoryLog>>,
    sync_enabled: AtomicBool,
    /// Bumped by every local mutation
    generation: AtomicU64,
    cap: usize,
}

impl HistoryStore {
    /// Create an empty store; call [`HistoryStore::load`] to read persisted history
    pub fn new(local: LocalHistoryLog, remote: Option<Arc<dyn HistoryLog>>) -> Self {
        Self {
            snapshot: RwLock::new(Vec::new()),
            local,
            remote,
            sync_enabled: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            cap: SESSION_HISTORY_CAP,
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_sync_enabled(self, enabled: bool) -> Self {
        self.sync_enabled.store(enabled, Ordering::SeqCst);
        self
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync_enabled.load(Ordering::SeqCst)
    }

    /// Remote log, only while sync is enabled
    fn active_remote(&self) -> Option<&Arc<dyn HistoryLog>> {
        self.remote.as_ref().filter(|_| self.sync_enabled())
    }

    /// Persist a snapshot locally; failures are logged and swallowed
    fn persist(&self, records: &[HistoryRecord]) {
        if let Err(e) = self.local.replace(records) {
            error!("Failed to persist history locally: {}", e);
        }
    }

    /// Read the local log and, with sync enabled, merge in the remote log
    ///
    /// Local entries win on id conflicts. The merged view replaces the snapshot
    /// and is written back to the local log unless a local mutation happened
    /// while the remote was being fetched. When the local log cannot be read,
    /// the current snapshot stands in for it and nothing is written back.
    pub async fn load(&self) -> Vec<SyncWarning> {
        let started_at = self.generation.load(Ordering::SeqCst);
        let mut warnings = Vec::new();

        // an unreadable local log must not be overwritten by the merge
        let (local_records, local_readable) = match self.local.load() {
            Ok(records) => (records, true),
            Err(e) => {
                error!("Failed to read local history, keeping the in-memory view: {}", e);
                (self.snapshot.read().await.clone(), false)
            },
        };

        let remote_records = match self.active_remote() {
            Some(remote) => match remote.list(self.cap, 0).await {
                Ok(page) => page.records,
                Err(e) => {
                    warn!("Remote history unavailable, using local history only: {}", e);
                    warnings.push(SyncWarning::Load(e.to_string()));
                    Vec::new()
                },
            },
            None => Vec::new(),
        };

        let merged = merge(local_records, remote_records, self.cap);

        let mut snapshot = self.snapshot.write().await;
        if self.generation.load(Ordering::SeqCst) != started_at {
            debug!("Discarding stale history merge, local history changed during load");
            return warnings;
        }
        if local_readable {
            self.persist(&merged);
        }
        info!("Loaded {} history records", merged.len());
        *snapshot = merged;

        warnings
    }

    /// Record a completed calculation
    pub async fn append(&self, record: HistoryRecord) -> Option<SyncWarning> {
        {
            let mut snapshot = self.snapshot.write().await;
            insert_sorted(&mut snapshot, record.clone(), self.cap);
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.persist(&snapshot);
        }
        debug!("Appended history record {}", record.id);

        let remote = self.active_remote()?;
        match remote.add(record).await {
            Ok(_) => None,
            Err(e) => {
                warn!("{}", SyncWarning::Append(e.to_string()));
                Some(SyncWarning::Append(e.to_string()))
            },
        }
    }

    /// Empty the local view unconditionally, then best-effort the remote log
    pub async fn clear(&self) -> Option<SyncWarning> {
        {
            let mut snapshot = self.snapshot.write().await;
            snapshot.clear();
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.persist(&snapshot);
        }
        info!("History cleared");

        let remote = self.active_remote()?;
        match remote.clear().await {
            Ok(removed) => {
                debug!("Remote history cleared ({} records)", removed);
                None
            },
            Err(e) => {
                warn!("{}", SyncWarning::Clear(e.to_string()));
                Some(SyncWarning::Clear(e.to_string()))
            },
        }
    }

    /// Remove one record
    ///
    /// Returns [`HistoryError::NotFound`] without touching anything when the id
    /// is not in the local view.
    pub async fn delete(&self, id: &str) -> Result<Option<SyncWarning>> {
        {
            let mut snapshot = self.snapshot.write().await;
            let position = snapshot
                .iter()
                .position(|record| record.id == id)
                .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
            snapshot.remove(position);
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.persist(&snapshot);
        }
        debug!("Deleted history record {}", id);

        let Some(remote) = self.active_remote() else {
            return Ok(None);
        };
        match remote.delete(id).await {
            Ok(found) => {
                if !found {
                    debug!("Remote history had no record {}", id);
                }
                Ok(None)
            },
            Err(e) => {
                warn!("{}", SyncWarning::Delete(e.to_string()));
                Ok(Some(SyncWarning::Delete(e.to_string())))
            },
        }
    }

    /// Toggle remote sync; enabling reconciles with the remote immediately
    pub async fn set_sync_enabled(&self, enabled: bool) -> Vec<SyncWarning> {
        let was_enabled = self.sync_enabled.swap(enabled, Ordering::SeqCst);
        info!("History sync {}", if enabled { "enabled" } else { "disabled" });
        if enabled && !was_enabled {
            self.load().await
        } else {
            Vec::new()
        }
    }

    /// Copy of the current newest-first snapshot
    pub async fn records(&self) -> Vec<HistoryRecord> {
        self.snapshot.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.snapshot.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshot.read().await.is_empty()
    }

    pub async fn stats(&self) -> HistoryStats {
        self.stats_at(Utc::now()).await
    }

    pub async fn stats_at(&self, now: DateTime<Utc>) -> HistoryStats {
        HistoryStats::compute(&self.snapshot.read().await, now)
    }
}
