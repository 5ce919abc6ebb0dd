use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use signal_core::{AssetAliasSet, RecommendationRecord, Signal};
use std::collections::HashMap;

/// Days a recommendation must mature before it is scored.
pub const MATURATION_DAYS: i64 = 7;
/// A Hold is correct while the realized move stays inside this band (%).
pub const HOLD_BAND_PCT: f64 = 2.0;

/// One row of the observed-performance log: realized forward return for an
/// asset as of a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub timestamp: DateTime<Utc>,
    pub asset: String,
    /// Realized percentage change, e.g. 3.0 = +3%
    pub forward_return_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetAccuracy {
    pub total: usize,
    pub correct: usize,
    pub accuracy_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub generated_at: DateTime<Utc>,
    pub period_days: i64,
    pub total_recommendations: usize,
    pub correct_recommendations: usize,
    pub accuracy_pct: f64,
    pub per_asset: HashMap<String, AssetAccuracy>,
}

/// Scores stored recommendations against later-observed performance.
pub struct AccuracyEvaluator {
    aliases: AssetAliasSet,
}

impl Default for AccuracyEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl AccuracyEvaluator {
    pub fn new() -> Self {
        Self {
            aliases: AssetAliasSet::default(),
        }
    }

    /// Score the trailing `days_back` window of recommendations.
    ///
    /// Returns None when the window holds no recommendations at all, and
    /// also when it holds some but none have a matured performance entry
    /// yet (two different situations, logged distinctly). A recommendation
    /// without a performance entry on/after its maturation date is
    /// excluded from scoring, never counted as incorrect.
    pub fn calculate_accuracy_report(
        &self,
        recommendations: &[RecommendationRecord],
        performance: &[PerformanceEntry],
        days_back: i64,
    ) -> Option<AccuracyReport> {
        self.calculate_accuracy_report_at(
            recommendations,
            performance,
            days_back,
            Utc::now().date_naive(),
        )
    }

    /// Window end pinned for deterministic evaluation.
    pub fn calculate_accuracy_report_at(
        &self,
        recommendations: &[RecommendationRecord],
        performance: &[PerformanceEntry],
        days_back: i64,
        as_of: NaiveDate,
    ) -> Option<AccuracyReport> {
        let cutoff = as_of - Duration::days(days_back);
        let window: Vec<&RecommendationRecord> = recommendations
            .iter()
            .filter(|r| r.date >= cutoff && r.date <= as_of)
            .collect();

        if window.is_empty() {
            tracing::info!(days_back, "no recommendations in window, nothing to score");
            return None;
        }

        let mut total = 0usize;
        let mut correct = 0usize;
        let mut per_asset: HashMap<String, (usize, usize)> = HashMap::new();
        let mut unmatured = 0usize;

        for rec in &window {
            let matured_at = rec.date + Duration::days(MATURATION_DAYS);
            let Some(realized) = self.lookup_forward_return(performance, &rec.asset, matured_at)
            else {
                unmatured += 1;
                continue;
            };

            let signal = rec.scored_signal();
            let is_correct = match signal {
                Signal::Buy => realized > 0.0,
                Signal::Sell => realized < 0.0,
                Signal::Hold => realized.abs() < HOLD_BAND_PCT,
            };

            total += 1;
            let slot = per_asset.entry(rec.asset.clone()).or_insert((0, 0));
            slot.0 += 1;
            if is_correct {
                correct += 1;
                slot.1 += 1;
            }
        }

        if total == 0 {
            tracing::info!(
                in_window = window.len(),
                unmatured,
                "recommendations present but none scoreable yet"
            );
            return None;
        }

        let per_asset = per_asset
            .into_iter()
            .map(|(asset, (asset_total, asset_correct))| {
                (
                    asset,
                    AssetAccuracy {
                        total: asset_total,
                        correct: asset_correct,
                        accuracy_pct: asset_correct as f64 / asset_total as f64 * 100.0,
                    },
                )
            })
            .collect();

        let report = AccuracyReport {
            generated_at: Utc::now(),
            period_days: days_back,
            total_recommendations: total,
            correct_recommendations: correct,
            accuracy_pct: correct as f64 / total as f64 * 100.0,
            per_asset,
        };

        tracing::info!(
            scored = total,
            correct,
            accuracy_pct = report.accuracy_pct,
            excluded = unmatured,
            "accuracy report computed"
        );
        Some(report)
    }

    /// First performance entry for the asset dated on or after the
    /// maturation date. Assets are matched canonically when both labels
    /// resolve, by exact label otherwise (private-log labels sit outside
    /// the public alias table on purpose).
    fn lookup_forward_return(
        &self,
        performance: &[PerformanceEntry],
        asset: &str,
        matured_at: NaiveDate,
    ) -> Option<f64> {
        let canonical = self.aliases.resolve(asset);
        performance
            .iter()
            .filter(|p| match (canonical, self.aliases.resolve(&p.asset)) {
                (Some(a), Some(b)) => a == b,
                _ => p.asset == asset,
            })
            .filter(|p| p.timestamp.date_naive() >= matured_at)
            .min_by_key(|p| p.timestamp)
            .map(|p| p.forward_return_pct)
    }
}
