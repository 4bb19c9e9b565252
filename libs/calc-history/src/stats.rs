//! Derived history statistics

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::HistoryRecord;

/// Counts by calendar window plus the time span covered
///
/// Windows are evaluated in UTC: `today` since midnight, `this_week` over the
/// trailing seven days and `this_month` since the first of the month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: usize,
    pub today: usize,
    pub this_week: usize,
    pub this_month: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

impl HistoryStats {
    pub fn compute(records: &[HistoryRecord], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let day_start = today.and_time(NaiveTime::MIN).and_utc();
        let week_start = now - Duration::days(7);
        let month_start = today
            .with_day(1)
            .unwrap_or(today)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let since = |start: DateTime<Utc>| records.iter().filter(|r| r.created_at >= start).count();

        Self {
            total: records.len(),
            today: since(day_start),
            this_week: since(week_start),
            this_month: since(month_start),
            oldest: records.iter().map(|r| r.created_at).min(),
            newest: records.iter().map(|r| r.created_at).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at(created_at: DateTime<Utc>) -> HistoryRecord {
        HistoryRecord::at("1 + 1", "2", created_at)
    }

    #[test]
    fn test_empty() {
        let stats = HistoryStats::compute(&[], Utc::now());
        assert_eq!(stats, HistoryStats::default());
    }

    #[test]
    fn test_windows() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap();
        let records = vec![
            record_at(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()), // today
            record_at(Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap()), // midnight
            record_at(Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap()), // this week
            record_at(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()),  // this month
            record_at(Utc.with_ymd_and_hms(2026, 2, 27, 8, 0, 0).unwrap()), // last month
        ];

        let stats = HistoryStats::compute(&records, now);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.today, 2);
        assert_eq!(stats.this_week, 3);
        assert_eq!(stats.this_month, 4);
        assert_eq!(stats.oldest, Some(records[4].created_at));
        assert_eq!(stats.newest, Some(records[0].created_at));
    }
}
