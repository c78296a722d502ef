use crate::{error::BoardResult, store::LapStore};
use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The podium always renders three tiers (1st/2nd/3rd), so every snapshot
/// carries at least this many entries.
pub const PODIUM_SIZE: usize = 3;

// Display name of synthetic entries padding out a sparse ranking.
pub const PLACEHOLDER_NAME: &'static str = "Niemand";

/// Identity and display fields of a participant, owned by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runner {
    pub number: u32,
    pub student_number: u32,
    pub first_name: String,
    pub last_name: String,
    pub house: String,
    pub grade: String,
}

/// A runner paired with its lap count for the current snapshot window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    #[serde(flatten)]
    pub runner: Runner,
    pub laps: u32,
}

impl RankingEntry {
    /// Fully-typed synthetic entry used to pad sparse rankings. Placeholders
    /// only ever live inside a snapshot, never in the store.
    pub fn placeholder(number: u32) -> RankingEntry {
        RankingEntry {
            runner: Runner {
                number,
                student_number: 0,
                first_name: PLACEHOLDER_NAME.to_string(),
                last_name: String::new(),
                house: String::new(),
                grade: String::new(),
            },
            laps: 0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.laps == 0 && self.runner.first_name == PLACEHOLDER_NAME
    }
}

/// Ordered, padded ranking for one display cycle. The paired expiry lives in
/// the cache slot, not here; the snapshot itself is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub entries: Vec<RankingEntry>,
    pub generated_at: String,
}

pub struct SnapshotBuilder {
    store: Arc<dyn LapStore>,
    timezone_hours_offset: i64,
}

impl SnapshotBuilder {
    pub fn new(store: Arc<dyn LapStore>, timezone_hours_offset: i64) -> Self {
        Self {
            store,
            timezone_hours_offset,
        }
    }

    /// Fetch, order and pad the ranking. A failed fetch surfaces as an error;
    /// placeholders only ever cover missing runners, not a missing store.
    pub async fn build(&self) -> BoardResult<Snapshot> {
        let fetched = self.store.fetch_runners_with_counts().await?;

        // Descending by laps, ties ascending by last then first name. The
        // sort is stable, so fully tied runners keep their fetch order.
        let mut entries = fetched
            .into_iter()
            .sorted_by(|a, b| {
                b.laps
                    .cmp(&a.laps)
                    .then_with(|| a.runner.last_name.cmp(&b.runner.last_name))
                    .then_with(|| a.runner.first_name.cmp(&b.runner.first_name))
            })
            .collect::<Vec<RankingEntry>>();

        while entries.len() < PODIUM_SIZE {
            entries.push(RankingEntry::placeholder(entries.len() as u32));
        }

        Ok(Snapshot {
            entries,
            generated_at: format_generated_at(Utc::now(), self.timezone_hours_offset),
        })
    }
}

/// Render the generation time the way the original display did: shifted by
/// the configured hour offset and formatted as a `de` locale date and time.
pub fn format_generated_at(now: DateTime<Utc>, hours_offset: i64) -> String {
    let shifted = now + Duration::hours(hours_offset);
    shifted.format("%-d.%-m.%Y %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoardError, BoardResult};
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FixedStore(Vec<RankingEntry>);

    #[async_trait]
    impl LapStore for FixedStore {
        async fn fetch_runners_with_counts(&self) -> BoardResult<Vec<RankingEntry>> {
            Ok(self.0.clone())
        }

        async fn record_lap(&self, _runner_number: u32) -> BoardResult<u32> {
            Err(BoardError::Store("read-only".to_string()))
        }
    }

    struct FailingStore;

    #[async_trait]
    impl LapStore for FailingStore {
        async fn fetch_runners_with_counts(&self) -> BoardResult<Vec<RankingEntry>> {
            Err(BoardError::Store("503 Service Unavailable".to_string()))
        }

        async fn record_lap(&self, _runner_number: u32) -> BoardResult<u32> {
            Err(BoardError::Store("503 Service Unavailable".to_string()))
        }
    }

    fn entry(number: u32, first: &str, last: &str, laps: u32) -> RankingEntry {
        RankingEntry {
            runner: Runner {
                number,
                student_number: 1000 + number,
                first_name: first.to_string(),
                last_name: last.to_string(),
                house: "Nord".to_string(),
                grade: "5b".to_string(),
            },
            laps,
        }
    }

    fn builder(entries: Vec<RankingEntry>) -> SnapshotBuilder {
        SnapshotBuilder::new(Arc::new(FixedStore(entries)), 0)
    }

    #[tokio::test]
    async fn orders_descending_by_laps() {
        let snapshot = builder(vec![
            entry(1, "Mia", "Keller", 3),
            entry(2, "Jonas", "Weber", 12),
            entry(3, "Lena", "Fischer", 7),
        ])
        .build()
        .await
        .unwrap();

        let laps = snapshot.entries.iter().map(|e| e.laps).collect::<Vec<_>>();
        assert_eq!(laps, vec![12, 7, 3]);
    }

    #[tokio::test]
    async fn ties_break_by_last_then_first_name() {
        // A and B share the lap count; B's last name sorts first.
        let snapshot = builder(vec![
            entry(1, "Anna", "Zimmer", 5),
            entry(2, "Ben", "Arnold", 5),
            entry(3, "Carl", "Meier", 3),
        ])
        .build()
        .await
        .unwrap();

        let names = snapshot
            .entries
            .iter()
            .map(|e| e.runner.last_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Arnold", "Zimmer", "Meier"]);
        // Exactly three real entries, so nothing gets padded.
        assert!(snapshot.entries.iter().all(|e| !e.is_placeholder()));
    }

    #[tokio::test]
    async fn equal_last_names_break_on_first_name() {
        let snapshot = builder(vec![
            entry(1, "Paul", "Schmidt", 8),
            entry(2, "Emma", "Schmidt", 8),
            entry(3, "Ole", "Brandt", 1),
        ])
        .build()
        .await
        .unwrap();

        assert_eq!(snapshot.entries[0].runner.first_name, "Emma");
        assert_eq!(snapshot.entries[1].runner.first_name, "Paul");
    }

    #[tokio::test]
    async fn full_ties_keep_fetch_order() {
        let snapshot = builder(vec![
            entry(7, "Kim", "Lang", 4),
            entry(8, "Kim", "Lang", 4),
            entry(9, "Kim", "Lang", 4),
        ])
        .build()
        .await
        .unwrap();

        let numbers = snapshot
            .entries
            .iter()
            .map(|e| e.runner.number)
            .collect::<Vec<_>>();
        assert_eq!(numbers, vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn empty_store_yields_three_placeholders() {
        let snapshot = builder(vec![]).build().await.unwrap();

        assert_eq!(snapshot.entries.len(), PODIUM_SIZE);
        for (i, e) in snapshot.entries.iter().enumerate() {
            assert!(e.is_placeholder());
            assert_eq!(e.laps, 0);
            assert_eq!(e.runner.number, i as u32);
            assert_eq!(e.runner.first_name, PLACEHOLDER_NAME);
            assert_eq!(e.runner.house, "");
            assert_eq!(e.runner.grade, "");
        }
    }

    #[tokio::test]
    async fn sparse_data_is_padded_after_real_entries() {
        let snapshot = builder(vec![entry(1, "Mia", "Keller", 9)])
            .build()
            .await
            .unwrap();

        assert_eq!(snapshot.entries.len(), PODIUM_SIZE);
        assert!(!snapshot.entries[0].is_placeholder());
        assert!(snapshot.entries[1].is_placeholder());
        assert!(snapshot.entries[2].is_placeholder());
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let builder = SnapshotBuilder::new(Arc::new(FailingStore), 0);
        assert!(builder.build().await.is_err());
    }

    #[test]
    fn generated_at_uses_de_locale_shape() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 4).unwrap();
        assert_eq!(format_generated_at(now, 0), "7.3.2024 09:05:04");
    }

    #[test]
    fn generated_at_applies_hour_offset() {
        let now = Utc.with_ymd_and_hms(2023, 12, 5, 22, 30, 5).unwrap();
        // +2 hours crosses midnight into the next day.
        assert_eq!(format_generated_at(now, 2), "6.12.2023 00:30:05");
    }
}
