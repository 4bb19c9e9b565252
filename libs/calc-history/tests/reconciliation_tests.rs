//! Reconciliation tests for HistoryStore
//!
//! Covers capping, merge idempotence, delete ordering, persistence across store
//! instances and the races between a slow remote load and local mutations.

// Allow unwrap() in tests for cleaner test code
#![allow(clippy::disallowed_methods)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use calc_history::{
    BlobStore, FileBlobStore, HistoryError, HistoryLog, HistoryPage, HistoryRecord, HistoryStats,
    HistoryStore, LocalHistoryLog, MemoryBlobStore, MemoryHistoryLog,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Notify;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap()
}

fn record(n: i64) -> HistoryRecord {
    HistoryRecord {
        id: format!("rec-{:03}", n),
        expression: format!("{} + 0", n),
        result: n.to_string(),
        created_at: base_time() + Duration::seconds(n),
    }
}

fn memory_local() -> LocalHistoryLog {
    LocalHistoryLog::new(Arc::new(MemoryBlobStore::new()))
}

fn ids(records: &[HistoryRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

/// Remote log whose `list` blocks until released
struct GatedLog {
    inner: MemoryHistoryLog,
    list_started: Notify,
    release: Notify,
}

impl GatedLog {
    fn new() -> Self {
        common::init_test_logging();
        Self {
            inner: MemoryHistoryLog::default(),
            list_started: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl HistoryLog for GatedLog {
    async fn list(&self, limit: usize, offset: usize) -> calc_history::Result<HistoryPage> {
        self.list_started.notify_one();
        self.release.notified().await;
        self.inner.list(limit, offset).await
    }

    async fn add(&self, record: HistoryRecord) -> calc_history::Result<HistoryRecord> {
        self.inner.add(record).await
    }

    async fn delete(&self, id: &str) -> calc_history::Result<bool> {
        self.inner.delete(id).await
    }

    async fn clear(&self) -> calc_history::Result<usize> {
        self.inner.clear().await
    }

    async fn stats(&self) -> calc_history::Result<HistoryStats> {
        self.inner.stats().await
    }
}

// ============================================================================
// Cap and ordering
// ============================================================================

#[tokio::test]
async fn test_cap_keeps_most_recent_hundred() {
    let store = HistoryStore::new(memory_local(), None);
    for n in 0..150 {
        store.append(record(n)).await;
    }

    let records = store.records().await;
    assert_eq!(records.len(), 100);
    assert_eq!(records[0].id, "rec-149");
    assert_eq!(records[99].id, "rec-050");
    assert!(records
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}

#[tokio::test]
async fn test_out_of_order_appends_stay_sorted() {
    let store = HistoryStore::new(memory_local(), None);
    for n in [5, 1, 9, 3] {
        store.append(record(n)).await;
    }
    assert_eq!(
        ids(&store.records().await),
        vec!["rec-009", "rec-005", "rec-003", "rec-001"]
    );
}

// ============================================================================
// Merge
// ============================================================================

#[tokio::test]
async fn test_merge_with_identical_remote_is_idempotent() {
    let local = memory_local();
    let remote = Arc::new(MemoryHistoryLog::default());
    let snapshot: Vec<_> = (0..10).rev().map(record).collect();

    local.replace(&snapshot).unwrap();
    for r in &snapshot {
        remote.add(r.clone()).await.unwrap();
    }

    let store = HistoryStore::new(local, Some(remote)).with_sync_enabled(true);
    assert!(store.load().await.is_empty());
    assert_eq!(store.records().await, snapshot);
}

#[tokio::test]
async fn test_merge_local_wins_and_is_persisted() {
    let local = memory_local();
    let remote = Arc::new(MemoryHistoryLog::default());

    let mut conflicting = record(1);
    conflicting.result = "remote copy".to_string();
    remote.add(conflicting).await.unwrap();
    remote.add(record(2)).await.unwrap();
    local.replace(&[record(1), record(0)]).unwrap();

    let store = HistoryStore::new(local.clone(), Some(remote)).with_sync_enabled(true);
    store.load().await;

    let records = store.records().await;
    assert_eq!(ids(&records), vec!["rec-002", "rec-001", "rec-000"]);
    assert_eq!(records[1].result, "1");
    assert_eq!(local.load().unwrap(), records);
}

#[tokio::test]
async fn test_merged_view_is_capped() {
    let local = memory_local();
    let remote = Arc::new(MemoryHistoryLog::default());
    let older: Vec<_> = (0..80).rev().map(record).collect();
    local.replace(&older).unwrap();
    for n in 80..160 {
        remote.add(record(n)).await.unwrap();
    }

    let store = HistoryStore::new(local, Some(remote)).with_sync_enabled(true);
    store.load().await;

    let records = store.records().await;
    assert_eq!(records.len(), 100);
    assert_eq!(records[0].id, "rec-159");
    assert_eq!(records[99].id, "rec-060");
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_removes_exactly_one_and_keeps_order() {
    let remote = Arc::new(MemoryHistoryLog::default());
    let store = HistoryStore::new(memory_local(), Some(remote.clone())).with_sync_enabled(true);
    for n in 0..5 {
        store.append(record(n)).await;
    }

    assert_eq!(store.delete("rec-002").await.unwrap(), None);
    assert_eq!(
        ids(&store.records().await),
        vec!["rec-004", "rec-003", "rec-001", "rec-000"]
    );
    assert_eq!(remote.len(), 4);

    let before = store.records().await;
    assert_eq!(
        store.delete("rec-002").await,
        Err(HistoryError::NotFound("rec-002".to_string()))
    );
    assert_eq!(store.records().await, before);
    assert_eq!(remote.len(), 4);
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let local = LocalHistoryLog::new(Arc::new(FileBlobStore::new(dir.path())));
        let store = HistoryStore::new(local, None);
        store.append(record(1)).await;
        store.append(record(2)).await;
    }

    let local = LocalHistoryLog::new(Arc::new(FileBlobStore::new(dir.path())));
    let store = HistoryStore::new(local, None);
    assert!(store.is_empty().await);
    store.load().await;
    assert_eq!(ids(&store.records().await), vec!["rec-002", "rec-001"]);
}

/// Blob store whose next `get` fails once armed
#[derive(Default)]
struct FlakyBlobStore {
    inner: MemoryBlobStore,
    fail_next_get: AtomicBool,
}

impl BlobStore for FlakyBlobStore {
    fn get(&self, key: &str) -> calc_history::Result<Option<Vec<u8>>> {
        if self.fail_next_get.swap(false, Ordering::SeqCst) {
            return Err(HistoryError::storage("disk read failed"));
        }
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> calc_history::Result<()> {
        self.inner.put(key, value)
    }
}

#[tokio::test]
async fn test_failed_local_read_keeps_history() {
    let blobs = Arc::new(FlakyBlobStore::default());
    let store = HistoryStore::new(LocalHistoryLog::new(blobs.clone()), None);
    for n in 1..=3 {
        store.append(record(n)).await;
    }

    blobs.fail_next_get.store(true, Ordering::SeqCst);
    store.load().await;
    assert_eq!(store.len().await, 3);

    let persisted = LocalHistoryLog::new(blobs.clone()).load().unwrap();
    assert_eq!(ids(&persisted), vec!["rec-003", "rec-002", "rec-001"]);
}

#[tokio::test]
async fn test_failed_local_read_still_merges_remote() {
    let blobs = Arc::new(FlakyBlobStore::default());
    let remote = Arc::new(MemoryHistoryLog::default());
    let store = HistoryStore::new(LocalHistoryLog::new(blobs.clone()), Some(remote.clone()))
        .with_sync_enabled(true);
    store.append(record(1)).await;
    remote.add(record(5)).await.unwrap();

    blobs.fail_next_get.store(true, Ordering::SeqCst);
    assert!(store.load().await.is_empty());
    assert_eq!(ids(&store.records().await), vec!["rec-005", "rec-001"]);

    // nothing written back while the local log was unreadable
    let persisted = LocalHistoryLog::new(blobs.clone()).load().unwrap();
    assert_eq!(ids(&persisted), vec!["rec-001"]);
}

// ============================================================================
// Races between a slow remote load and local mutations
// ============================================================================

#[tokio::test]
async fn test_clear_during_slow_load_is_not_undone() {
    let local = memory_local();
    local.replace(&[record(1)]).unwrap();
    let remote = Arc::new(GatedLog::new());
    remote.inner.add(record(2)).await.unwrap();

    let store = Arc::new(
        HistoryStore::new(local.clone(), Some(remote.clone())).with_sync_enabled(true),
    );

    let loading = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });
    remote.list_started.notified().await;

    // clear wipes the remote too, then the stale fetch completes
    assert!(store.clear().await.is_none());
    remote.release.notify_one();
    loading.await.unwrap();

    assert!(store.is_empty().await);
    assert!(local.load().unwrap().is_empty());
}

#[tokio::test]
async fn test_append_during_slow_load_wins() {
    let local = memory_local();
    let remote = Arc::new(GatedLog::new());
    remote.inner.add(record(1)).await.unwrap();

    let store = Arc::new(
        HistoryStore::new(local.clone(), Some(remote.clone())).with_sync_enabled(true),
    );

    let loading = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });
    remote.list_started.notified().await;

    store.append(record(5)).await;
    remote.release.notify_one();
    loading.await.unwrap();

    assert_eq!(ids(&store.records().await), vec!["rec-005"]);
    assert_eq!(ids(&local.load().unwrap()), vec!["rec-005"]);

    // a later load picks up the remote record again
    let load_again = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });
    remote.list_started.notified().await;
    remote.release.notify_one();
    load_again.await.unwrap();
    assert_eq!(ids(&store.records().await), vec!["rec-005", "rec-001"]);
}

// ============================================================================
// Stats
// ============================================================================

#[tokio::test]
async fn test_stats_follow_snapshot() {
    let store = HistoryStore::new(memory_local(), None);
    for n in 0..3 {
        store.append(record(n)).await;
    }

    let stats = store.stats_at(base_time() + Duration::hours(1)).await;
    assert_eq!(stats.total, 3);
    assert_eq!(stats.today, 3);
    assert_eq!(stats.oldest, Some(record(0).created_at));
    assert_eq!(stats.newest, Some(record(2).created_at));
}
