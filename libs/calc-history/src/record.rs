//! History record model and snapshot ordering helpers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Cap of the per-session history view
pub const SESSION_HISTORY_CAP: usize = 100;
/// Cap of the server-side bulk log
pub const SERVER_HISTORY_CAP: usize = 1000;

/// One completed calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub expression: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// New record with a fresh id, stamped now
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self::at(expression, result, Utc::now())
    }

    /// New record with a fresh id and an explicit timestamp
    pub fn at(
        expression: impl Into<String>,
        result: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            expression: expression.into(),
            result: result.into(),
            created_at,
        }
    }
}

/// Record submitted to a history log; missing fields are filled on acceptance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewRecord {
    pub fn into_record(self) -> HistoryRecord {
        HistoryRecord {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            expression: self.expression,
            result: self.result,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

impl From<&HistoryRecord> for NewRecord {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            expression: record.expression.clone(),
            result: record.result.clone(),
            created_at: Some(record.created_at),
        }
    }
}

/// Insert into a newest-first snapshot and enforce `cap`
///
/// A record with the same id is replaced. The record goes before the first entry
/// that is not newer than it, so equal timestamps favour the latest insertion.
pub fn insert_sorted(records: &mut Vec<HistoryRecord>, record: HistoryRecord, cap: usize) {
    records.retain(|existing| existing.id != record.id);
    let position = records
        .iter()
        .position(|existing| existing.created_at <= record.created_at)
        .unwrap_or(records.len());
    records.insert(position, record);
    records.truncate(cap);
}

/// Merge two snapshots: dedupe by id (first occurrence wins), newest first, capped
pub fn merge(
    primary: Vec<HistoryRecord>,
    secondary: Vec<HistoryRecord>,
    cap: usize,
) -> Vec<HistoryRecord> {
    let mut seen = HashSet::new();
    let mut merged: Vec<HistoryRecord> = primary
        .into_iter()
        .chain(secondary)
        .filter(|record| seen.insert(record.id.clone()))
        .collect();
    // stable: equal timestamps keep concatenation order
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged.truncate(cap);
    merged
}
