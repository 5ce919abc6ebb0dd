use chrono::{Duration, NaiveDate, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use signal_core::{RecommendationRecord, SignalError};
use std::fs;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, SignalError>;

fn persistence_err(action: &str, path: &Path, err: impl std::fmt::Display) -> SignalError {
    SignalError::PersistenceFailure(format!("{action} {}: {err}", path.display()))
}

pub struct RecommendationHistoryStore {
    path: PathBuf,
}

impl RecommendationHistoryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Upsert the day's records: drop any existing rows for `date`, append
    /// the new ones, rewrite the whole file sorted by date descending.
    /// Replays of the same day therefore leave exactly one snapshot.
    pub fn append_daily(&self, date: NaiveDate, records: &[RecommendationRecord]) -> Result<()> {
        let mut history = self.load_all()?;
        let before = history.len();
        history.retain(|r| r.date != date);
        let replaced = before - history.len();
        history.extend(records.iter().cloned());
        history.sort_by(|a, b| b.date.cmp(&a.date));

        self.write_all(&history)?;

        tracing::info!(
            date = %date,
            written = records.len(),
            replaced,
            total = history.len(),
            path = %self.path.display(),
            "recommendation history updated"
        );
        Ok(())
    }

    /// Full history, newest first. A missing file is an empty history, not
    /// an error; a malformed row is skipped with a warning so one bad line
    /// cannot take down every later report.
    pub fn load_all(&self) -> Result<Vec<RecommendationRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(|e| persistence_err("opening history file", &self.path, e))?;

        let mut records = Vec::new();
        for (idx, row) in reader.deserialize::<RecommendationRecord>().enumerate() {
            match row {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(row = idx + 1, error = %e, "skipping malformed history row");
                }
            }
        }
        Ok(records)
    }

    /// Records dated within the trailing `days` window, newest first.
    pub fn load_window(&self, days: i64) -> Result<Vec<RecommendationRecord>> {
        let cutoff = Utc::now().date_naive() - Duration::days(days);
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| r.date >= cutoff)
            .collect())
    }

    /// Rewrite the entire table through a sibling temp file so a kill
    /// mid-write cannot truncate existing history.
    fn write_all(&self, records: &[RecommendationRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| persistence_err("creating history dir", parent, e))?;
            }
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let mut writer = WriterBuilder::new()
                .has_headers(true)
                .from_path(&tmp_path)
                .map_err(|e| persistence_err("opening temp history file", &tmp_path, e))?;
            for record in records {
                writer
                    .serialize(record)
                    .map_err(|e| persistence_err("writing history row to", &tmp_path, e))?;
            }
            writer
                .flush()
                .map_err(|e| persistence_err("flushing", &tmp_path, e))?;
        }
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| persistence_err("replacing history file", &self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use signal_core::{ConfidenceTier, Signal};
    use tempfile::TempDir;

    fn record(date: NaiveDate, asset: &str, signal: Signal, label: &str) -> RecommendationRecord {
        RecommendationRecord {
            date,
            timestamp: Utc.with_ymd_and_hms(2026, 8, 6, 7, 30, 0).unwrap(),
            asset: asset.to_string(),
            technical_signal: signal,
            technical_strength: 0.75,
            ml_signal: signal,
            ml_strength: 0.66,
            ml_accuracy: 61.5,
            ml_probability: 78.0,
            agreement: true,
            recommendation: label.to_string(),
            confidence: ConfidenceTier::High,
            news_impact: 0.4,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = RecommendationHistoryStore::new(dir.path().join("history.csv"));
        assert!(store.load_all().unwrap().is_empty());
        assert!(store.load_window(30).unwrap().is_empty());
    }

    #[test]
    fn round_trips_records_through_csv() {
        let dir = TempDir::new().unwrap();
        let store = RecommendationHistoryStore::new(dir.path().join("history.csv"));
        let d = day(2026, 8, 5);
        store
            .append_daily(d, &[record(d, "Gold", Signal::Buy, "STRONG BUY")])
            .unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].asset, "Gold");
        assert_eq!(loaded[0].technical_signal, Signal::Buy);
        assert_eq!(loaded[0].recommendation, "STRONG BUY");
        assert_eq!(loaded[0].confidence, ConfidenceTier::High);
        assert!((loaded[0].ml_probability - 78.0).abs() < 1e-9);
    }

    #[test]
    fn same_date_rewrite_replaces_previous_rows() {
        let dir = TempDir::new().unwrap();
        let store = RecommendationHistoryStore::new(dir.path().join("history.csv"));
        let d = day(2026, 8, 5);

        store
            .append_daily(d, &[record(d, "Gold", Signal::Buy, "BUY")])
            .unwrap();
        store
            .append_daily(d, &[record(d, "Gold", Signal::Sell, "SELL")])
            .unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].technical_signal, Signal::Sell);
        assert_eq!(loaded[0].recommendation, "SELL");
    }

    #[test]
    fn other_dates_survive_an_upsert() {
        let dir = TempDir::new().unwrap();
        let store = RecommendationHistoryStore::new(dir.path().join("history.csv"));
        let d1 = day(2026, 8, 4);
        let d2 = day(2026, 8, 5);

        store
            .append_daily(d1, &[record(d1, "Gold", Signal::Buy, "BUY")])
            .unwrap();
        store
            .append_daily(d2, &[record(d2, "Gold", Signal::Hold, "HOLD")])
            .unwrap();
        store
            .append_daily(d2, &[record(d2, "Bitcoin", Signal::Sell, "SELL")])
            .unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        // newest first
        assert_eq!(loaded[0].date, d2);
        assert_eq!(loaded[0].asset, "Bitcoin");
        assert_eq!(loaded[1].date, d1);
        assert_eq!(loaded[1].asset, "Gold");
    }

    #[test]
    fn window_filters_by_trailing_days() {
        let dir = TempDir::new().unwrap();
        let store = RecommendationHistoryStore::new(dir.path().join("history.csv"));
        let today = Utc::now().date_naive();
        let recent = today - Duration::days(3);
        let stale = today - Duration::days(45);

        store
            .append_daily(recent, &[record(recent, "Gold", Signal::Buy, "BUY")])
            .unwrap();
        store
            .append_daily(stale, &[record(stale, "Bitcoin", Signal::Sell, "SELL")])
            .unwrap();

        let window = store.load_window(30).unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].asset, "Gold");
    }

    #[test]
    fn multiple_assets_per_day_all_persist() {
        let dir = TempDir::new().unwrap();
        let store = RecommendationHistoryStore::new(dir.path().join("history.csv"));
        let d = day(2026, 8, 5);
        let records = vec![
            record(d, "Dollar Index", Signal::Hold, "HOLD"),
            record(d, "S&P 500", Signal::Buy, "STRONG BUY"),
            record(d, "Gold", Signal::Buy, "BUY"),
            record(d, "Bitcoin", Signal::Sell, "CAUTION"),
        ];
        store.append_daily(d, &records).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 4);
    }
}
