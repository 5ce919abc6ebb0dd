use crate::evaluator::AccuracyReport;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use signal_core::SignalError;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, SignalError>;

fn persistence_err(action: &str, path: &Path, err: impl std::fmt::Display) -> SignalError {
    SignalError::PersistenceFailure(format!("{action} {}: {err}", path.display()))
}

/// Flat row persisted per computed report. Pure append, no dedup: every
/// evaluation run leaves a trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccuracyLogRow {
    generated_at: DateTime<Utc>,
    period_days: i64,
    total_recommendations: usize,
    correct_recommendations: usize,
    accuracy_pct: f64,
}

pub struct AccuracyLog {
    path: PathBuf,
}

impl AccuracyLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one summary row for a computed report, creating the file
    /// (with headers) on first use.
    pub fn append(&self, report: &AccuracyReport) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| persistence_err("creating accuracy log dir", parent, e))?;
            }
        }

        let fresh = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| persistence_err("opening accuracy log", &self.path, e))?;

        let mut writer = WriterBuilder::new().has_headers(fresh).from_writer(file);
        writer
            .serialize(AccuracyLogRow {
                generated_at: report.generated_at,
                period_days: report.period_days,
                total_recommendations: report.total_recommendations,
                correct_recommendations: report.correct_recommendations,
                accuracy_pct: report.accuracy_pct,
            })
            .map_err(|e| persistence_err("writing accuracy row to", &self.path, e))?;
        writer
            .flush()
            .map_err(|e| persistence_err("flushing", &self.path, e))?;

        tracing::info!(
            path = %self.path.display(),
            accuracy_pct = report.accuracy_pct,
            "accuracy report appended"
        );
        Ok(())
    }
}
