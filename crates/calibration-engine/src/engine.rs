use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use signal_core::Signal;
use std::collections::HashMap;

/// Minimum qualifying entries before any nonzero adjustment is produced.
const MIN_SAMPLE: usize = 5;
/// Entry counts unlocking the small and large accuracy boosts.
const BOOST_SMALL_AT: usize = 10;
const BOOST_LARGE_AT: usize = 20;
/// Distinct observed days unlocking the confidence multiplier.
const CONFIDENCE_DAYS_AT: usize = 7;
/// BUY/SELL ratio beyond which an asset counts as directionally biased.
const BIAS_RATIO: f64 = 0.6;

/// Fixed private asset vocabulary. Deliberately distinct from the public
/// canonical set; the private log tracks a cash bucket and names the index
/// position by its ETF.
pub const PRIVATE_ASSETS: [&str; 5] = [
    "Cash/Liquidità",
    "Dollar Index",
    "ETF S&P500",
    "Gold",
    "Bitcoin",
];

/// One row of the private recommendation log. Never leaves this crate's
/// compute path; only aggregates do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateRecommendation {
    pub timestamp: DateTime<Utc>,
    pub asset: String,
    pub signal: Signal,
}

/// Historical directional tendency of one private asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetBias {
    BullishTendency,
    BearishTendency,
    Neutral,
}

impl AssetBias {
    /// Whether this bias points the same way as a consensus signal.
    pub fn matches(&self, signal: Signal) -> bool {
        matches!(
            (self, signal),
            (AssetBias::BullishTendency, Signal::Buy) | (AssetBias::BearishTendency, Signal::Sell)
        )
    }
}

/// Aggregate, privacy-safe calibration output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationMetrics {
    pub total_recommendations: usize,
    pub distinct_days: usize,
    /// 0, 0.03 or 0.05: additive boost in accuracy percentage points / 100
    pub accuracy_boost: f64,
    /// 1.0 or 1.1: multiplier on consensus strength
    pub confidence_adjustment: f64,
    asset_bias: HashMap<String, AssetBias>,
}

impl CalibrationMetrics {
    /// All-zero metrics for when history is missing or too thin.
    pub fn neutral() -> Self {
        Self {
            total_recommendations: 0,
            distinct_days: 0,
            accuracy_boost: 0.0,
            confidence_adjustment: 1.0,
            asset_bias: HashMap::new(),
        }
    }

    /// Bias for a private-vocabulary label. Unknown labels are neutral.
    pub fn bias_for(&self, private_label: &str) -> AssetBias {
        self.asset_bias
            .get(private_label)
            .copied()
            .unwrap_or(AssetBias::Neutral)
    }

    pub fn has_observations(&self) -> bool {
        self.total_recommendations > 0
    }
}

/// Remap a public/ML-source label into the private vocabulary before a bias
/// lookup. Kept separate from the public alias resolver on purpose: this
/// mapping crosses the privacy boundary and must stay one-way.
pub fn remap_to_private(label: &str) -> Option<&'static str> {
    let trimmed = label.trim();
    match trimmed {
        "Gold" | "Gold ($/oz)" | "Tether Gold" => Some("Gold"),
        "S&P 500" | "S&P500" | "SP500" | "ETF S&P500" => Some("ETF S&P500"),
        "Bitcoin" | "Bitcoin ($)" | "BTC" => Some("Bitcoin"),
        "Dollar Index" | "US Dollar Index" | "Dollar" | "DXY" => Some("Dollar Index"),
        "Cash" | "Liquidità" | "Cash/Liquidità" => Some("Cash/Liquidità"),
        _ => None,
    }
}

pub struct PrivateCalibrationEngine;

impl Default for PrivateCalibrationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PrivateCalibrationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute calibration metrics over the trailing `days` window of the
    /// private log. Below the minimum sample every adjustment stays neutral,
    /// though the observed count is still reported.
    pub fn compute_calibration(
        &self,
        entries: &[PrivateRecommendation],
        days: i64,
    ) -> CalibrationMetrics {
        self.compute_calibration_at(entries, days, Utc::now())
    }

    /// Window end pinned for deterministic evaluation.
    pub fn compute_calibration_at(
        &self,
        entries: &[PrivateRecommendation],
        days: i64,
        as_of: DateTime<Utc>,
    ) -> CalibrationMetrics {
        let cutoff = as_of - Duration::days(days);
        let window: Vec<&PrivateRecommendation> = entries
            .iter()
            .filter(|e| e.timestamp >= cutoff && e.timestamp <= as_of)
            .collect();

        let total = window.len();
        let distinct_days = {
            let mut observed: Vec<_> = window.iter().map(|e| e.timestamp.date_naive()).collect();
            observed.sort_unstable();
            observed.dedup();
            observed.len()
        };

        if total < MIN_SAMPLE {
            tracing::debug!(
                total,
                minimum = MIN_SAMPLE,
                "private history below minimum sample, calibration stays neutral"
            );
            return CalibrationMetrics {
                total_recommendations: total,
                distinct_days,
                ..CalibrationMetrics::neutral()
            };
        }

        let accuracy_boost = if total >= BOOST_LARGE_AT {
            0.05
        } else if total >= BOOST_SMALL_AT {
            0.03
        } else {
            0.0
        };

        let confidence_adjustment = if distinct_days >= CONFIDENCE_DAYS_AT {
            1.1
        } else {
            1.0
        };

        let mut asset_bias = HashMap::new();
        for private_asset in PRIVATE_ASSETS {
            let asset_entries: Vec<&&PrivateRecommendation> = window
                .iter()
                .filter(|e| {
                    remap_to_private(&e.asset)
                        .map(|mapped| mapped == private_asset)
                        .unwrap_or(e.asset == private_asset)
                })
                .collect();
            if asset_entries.is_empty() {
                continue;
            }

            let n = asset_entries.len() as f64;
            let buys = asset_entries
                .iter()
                .filter(|e| e.signal == Signal::Buy)
                .count() as f64;
            let sells = asset_entries
                .iter()
                .filter(|e| e.signal == Signal::Sell)
                .count() as f64;

            let bias = if buys / n > BIAS_RATIO {
                AssetBias::BullishTendency
            } else if sells / n > BIAS_RATIO {
                AssetBias::BearishTendency
            } else {
                AssetBias::Neutral
            };
            asset_bias.insert(private_asset.to_string(), bias);
        }

        tracing::info!(
            total,
            distinct_days,
            accuracy_boost,
            confidence_adjustment,
            biased_assets = asset_bias
                .values()
                .filter(|b| **b != AssetBias::Neutral)
                .count(),
            "calibration metrics computed"
        );

        CalibrationMetrics {
            total_recommendations: total,
            distinct_days,
            accuracy_boost,
            confidence_adjustment,
            asset_bias,
        }
    }
}
