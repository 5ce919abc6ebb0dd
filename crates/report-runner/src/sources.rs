//! CSV loaders for the already-fetched input tables.
//!
//! Absent files are a normal condition (a fetch collaborator may have
//! failed upstream): loaders return None/empty with a warning and the
//! pipeline degrades per-asset instead of aborting the run.

use anyhow::{Context, Result};
use calibration_engine::PrivateRecommendation;
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use accuracy_tracker::PerformanceEntry;
use ml_signals::ModelRow;
use portfolio_insights::Position;
use serde::Deserialize;
use signal_core::Signal;
use std::path::Path;
use technical_signals::{IndicatorCell, IndicatorRow};

/// Technical table: first column is the asset label, every further column
/// is one indicator. Cells hold Buy/Sell/Hold; anything unparseable
/// (empty, NaN, dashes) becomes a missing cell and counts as Hold.
pub fn load_technical(path: impl AsRef<Path>) -> Result<Option<Vec<IndicatorRow>>> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(path = %path.display(), "technical source missing");
        return Ok(None);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening technical source {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let indicator_names: Vec<String> = headers.iter().skip(1).map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(asset_label) = record.get(0).map(|s| s.trim().to_string()) else {
            continue;
        };
        if asset_label.is_empty() {
            continue;
        }

        let cells = indicator_names
            .iter()
            .enumerate()
            .map(|(i, name)| IndicatorCell {
                indicator: name.clone(),
                signal: record.get(i + 1).and_then(Signal::parse_label),
            })
            .collect();

        rows.push(IndicatorRow { asset_label, cells });
    }

    tracing::info!(path = %path.display(), rows = rows.len(), "technical source loaded");
    Ok(Some(rows))
}

#[derive(Debug, Deserialize)]
struct MlCsvRow {
    asset: String,
    model: String,
    probability: f64,
    accuracy: f64,
}

/// ML predictions table: one row per (asset, model).
pub fn load_models(path: impl AsRef<Path>) -> Result<Option<Vec<ModelRow>>> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(path = %path.display(), "ml source missing");
        return Ok(None);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening ml source {}", path.display()))?;

    let mut rows = Vec::new();
    for record in reader.deserialize::<MlCsvRow>() {
        match record {
            Ok(row) => rows.push(ModelRow {
                asset_label: row.asset,
                model: row.model,
                probability: row.probability,
                accuracy: row.accuracy,
            }),
            Err(e) => tracing::warn!(error = %e, "skipping malformed ml row"),
        }
    }

    tracing::info!(path = %path.display(), rows = rows.len(), "ml source loaded");
    Ok(Some(rows))
}

#[derive(Debug, Deserialize)]
struct PrivateCsvRow {
    timestamp: DateTime<Utc>,
    asset: String,
    signal: Signal,
}

/// Private recommendation log. Missing file means no calibration history.
pub fn load_private_log(path: impl AsRef<Path>) -> Result<Vec<PrivateRecommendation>> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(path = %path.display(), "private log missing, calibration stays neutral");
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening private log {}", path.display()))?;

    let mut entries = Vec::new();
    for record in reader.deserialize::<PrivateCsvRow>() {
        match record {
            Ok(row) => entries.push(PrivateRecommendation {
                timestamp: row.timestamp,
                asset: row.asset,
                signal: row.signal,
            }),
            Err(e) => tracing::warn!(error = %e, "skipping malformed private log row"),
        }
    }
    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct PerformanceCsvRow {
    timestamp: DateTime<Utc>,
    asset: String,
    forward_return_pct: f64,
}

/// Observed-performance log used by the accuracy evaluator.
pub fn load_performance(path: impl AsRef<Path>) -> Result<Vec<PerformanceEntry>> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(path = %path.display(), "performance log missing, accuracy scoring skipped");
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening performance log {}", path.display()))?;

    let mut entries = Vec::new();
    for record in reader.deserialize::<PerformanceCsvRow>() {
        match record {
            Ok(row) => entries.push(PerformanceEntry {
                timestamp: row.timestamp,
                asset: row.asset,
                forward_return_pct: row.forward_return_pct,
            }),
            Err(e) => tracing::warn!(error = %e, "skipping malformed performance row"),
        }
    }
    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct PositionCsvRow {
    asset: String,
    value: f64,
}

/// Personal portfolio positions. Missing file means no portfolio section.
pub fn load_positions(path: impl AsRef<Path>) -> Result<Vec<Position>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening positions file {}", path.display()))?;

    let mut positions = Vec::new();
    for record in reader.deserialize::<PositionCsvRow>() {
        match record {
            Ok(row) => positions.push(Position {
                asset: row.asset,
                value: row.value,
            }),
            Err(e) => tracing::warn!(error = %e, "skipping malformed position row"),
        }
    }
    Ok(positions)
}
