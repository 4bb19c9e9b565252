//! calc-history - Calculation history with local-first remote sync
//!
//! # Components
//!
//! - [`HistoryRecord`]: one completed calculation
//! - [`HistoryLog`]: list / add / delete / clear / stats capability, implemented by
//!   [`MemoryHistoryLog`] (calcsrv's bulk log), [`LocalHistoryLog`] (JSON snapshot in
//!   a [`BlobStore`]) and [`HttpHistoryLog`] (remote calcsrv)
//! - [`HistoryStore`]: the reconciled, deduplicated, capped view a session works with
//!
//! # Example
//!
//! ```rust
//! use calc_history::{HistoryRecord, HistoryStore, LocalHistoryLog, MemoryBlobStore};
//! use std::sync::Arc;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread()
//! #     .enable_all()
//! #     .build()
//! #     .unwrap();
//! # rt.block_on(async {
//! let local = LocalHistoryLog::new(Arc::new(MemoryBlobStore::new()));
//! let store = HistoryStore::new(local, None);
//!
//! store.append(HistoryRecord::new("5 + 3", "8")).await;
//! assert_eq!(store.records().await[0].result, "8");
//! # });
//! ```

pub mod api;
pub mod blob;
pub mod error;
pub mod http;
pub mod local;
pub mod log;
pub mod memory;
pub mod record;
pub mod stats;
pub mod store;

// Re-exports for convenience
pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use error::{HistoryError, Result};
pub use http::HttpHistoryLog;
pub use local::LocalHistoryLog;
pub use log::{HistoryLog, HistoryPage};
pub use memory::MemoryHistoryLog;
pub use record::{merge, HistoryRecord, NewRecord, SERVER_HISTORY_CAP, SESSION_HISTORY_CAP};
pub use stats::HistoryStats;
pub use store::{HistoryStore, SyncWarning};
