use calibration_engine::{remap_to_private, CalibrationMetrics};
use serde::{Deserialize, Serialize};
use signal_core::{MlConsensus, ModelSignal, Signal};

/// Probability at or above which a model vote counts as Buy.
pub const BUY_THRESHOLD: f64 = 75.0;
/// Probability at or below which a model vote counts as Sell.
pub const SELL_THRESHOLD: f64 = 25.0;

/// Caps applied after calibration. Accuracy and probability live on the
/// 0-100 scale; strength on 0-1.
const MAX_ADJUSTED_ACCURACY: f64 = 95.0;
const MAX_ADJUSTED_PROBABILITY: f64 = 95.0;
/// Probability lift when historical bias agrees with the consensus direction.
const BIAS_PROBABILITY_LIFT: f64 = 1.05;

/// One row of the ML predictions table: one (asset, model) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRow {
    pub asset_label: String,
    pub model: String,
    /// 0-100
    pub probability: f64,
    /// 0-100
    pub accuracy: f64,
}

/// Threshold rule shared by every model: >=75 Buy, <=25 Sell, else Hold.
/// Both cut points are inclusive; no hysteresis.
pub fn derive_signal(probability: f64) -> Signal {
    if probability >= BUY_THRESHOLD {
        Signal::Buy
    } else if probability <= SELL_THRESHOLD {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

pub struct MlSignalAggregator;

impl Default for MlSignalAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MlSignalAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Collapse all model rows for one asset into an ML consensus.
    ///
    /// Consensus is the signal with the most model votes; exact ties are
    /// broken by the fixed order Buy > Sell > Hold, never by map iteration.
    /// Returns None for an asset with no rows; the comparator treats the
    /// absence as Hold/0 downstream.
    pub fn aggregate(&self, rows: &[ModelRow]) -> Option<MlConsensus> {
        if rows.is_empty() {
            return None;
        }

        let per_model: Vec<ModelSignal> = rows
            .iter()
            .map(|row| ModelSignal {
                model: row.model.clone(),
                signal: derive_signal(row.probability),
                probability: row.probability,
                accuracy: row.accuracy,
            })
            .collect();

        // First-seen max over the fixed vote order, so Buy beats Sell beats
        // Hold on an exact tie. max_by_key would keep the last maximum.
        let votes = |signal: Signal| per_model.iter().filter(|m| m.signal == signal).count();
        let top = Signal::VOTE_ORDER
            .iter()
            .map(|s| votes(*s))
            .max()
            .unwrap_or(0);
        let consensus_signal = Signal::VOTE_ORDER
            .into_iter()
            .find(|s| votes(*s) == top)
            .unwrap_or(Signal::Hold);

        let total = per_model.len() as f64;
        let avg_probability = per_model.iter().map(|m| m.probability).sum::<f64>() / total;
        let avg_accuracy = per_model.iter().map(|m| m.accuracy).sum::<f64>() / total;

        tracing::debug!(
            asset = %rows[0].asset_label,
            signal = %consensus_signal,
            models = per_model.len(),
            avg_probability,
            avg_accuracy,
            "ml consensus"
        );

        Some(MlConsensus {
            consensus_signal,
            consensus_strength: top as f64 / total,
            avg_probability,
            avg_accuracy,
            per_model,
            calibration_applied: false,
        })
    }

    /// Fold private calibration aggregates into a consensus, in place.
    ///
    /// No-ops (and leaves `calibration_applied` false) when the metrics saw
    /// zero recommendations. Accuracy gets an additive boost in percentage
    /// points, strength a multiplicative adjustment, and probability a 5%
    /// lift only when the asset's historical bias points the same way as
    /// the consensus. All three are capped.
    pub fn apply_calibration(
        &self,
        consensus: &mut MlConsensus,
        metrics: &CalibrationMetrics,
        asset_label: &str,
    ) {
        if !metrics.has_observations() {
            return;
        }

        consensus.avg_accuracy =
            (consensus.avg_accuracy + metrics.accuracy_boost * 100.0).min(MAX_ADJUSTED_ACCURACY);
        consensus.consensus_strength =
            (consensus.consensus_strength * metrics.confidence_adjustment).min(1.0);

        if let Some(private_label) = remap_to_private(asset_label) {
            let bias = metrics.bias_for(private_label);
            if bias.matches(consensus.consensus_signal) {
                consensus.avg_probability =
                    (consensus.avg_probability * BIAS_PROBABILITY_LIFT).min(MAX_ADJUSTED_PROBABILITY);
                tracing::debug!(
                    asset = asset_label,
                    private_label,
                    "historical bias matches consensus, probability lifted"
                );
            }
        }

        consensus.calibration_applied = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibration_engine::{PrivateCalibrationEngine, PrivateRecommendation};
    use chrono::{Duration, TimeZone, Utc};

    fn row(asset: &str, model: &str, probability: f64, accuracy: f64) -> ModelRow {
        ModelRow {
            asset_label: asset.to_string(),
            model: model.to_string(),
            probability,
            accuracy,
        }
    }

    #[test]
    fn thresholds_are_inclusive_at_both_cut_points() {
        assert_eq!(derive_signal(75.0), Signal::Buy);
        assert_eq!(derive_signal(74.9), Signal::Hold);
        assert_eq!(derive_signal(25.0), Signal::Sell);
        assert_eq!(derive_signal(25.1), Signal::Hold);
        assert_eq!(derive_signal(100.0), Signal::Buy);
        assert_eq!(derive_signal(0.0), Signal::Sell);
        assert_eq!(derive_signal(50.0), Signal::Hold);
    }

    #[test]
    fn empty_rows_produce_no_consensus() {
        assert!(MlSignalAggregator::new().aggregate(&[]).is_none());
    }

    #[test]
    fn majority_vote_wins() {
        let rows = vec![
            row("Bitcoin", "lstm", 80.0, 62.0),
            row("Bitcoin", "gru", 78.0, 58.0),
            row("Bitcoin", "rf", 40.0, 55.0),
        ];
        let consensus = MlSignalAggregator::new().aggregate(&rows).unwrap();
        assert_eq!(consensus.consensus_signal, Signal::Buy);
        assert!((consensus.consensus_strength - 2.0 / 3.0).abs() < 1e-9);
        assert!((consensus.avg_probability - 66.0).abs() < 1e-9);
        assert!(!consensus.calibration_applied);
    }

    #[test]
    fn exact_tie_prefers_buy_then_sell() {
        let buy_sell_tie = vec![
            row("Gold", "a", 80.0, 60.0),
            row("Gold", "b", 20.0, 60.0),
        ];
        let consensus = MlSignalAggregator::new().aggregate(&buy_sell_tie).unwrap();
        assert_eq!(consensus.consensus_signal, Signal::Buy);

        let sell_hold_tie = vec![
            row("Gold", "a", 20.0, 60.0),
            row("Gold", "b", 50.0, 60.0),
        ];
        let consensus = MlSignalAggregator::new().aggregate(&sell_hold_tie).unwrap();
        assert_eq!(consensus.consensus_signal, Signal::Sell);
    }

    #[test]
    fn averages_cover_all_rows() {
        let rows = vec![
            row("Gold", "a", 90.0, 80.0),
            row("Gold", "b", 10.0, 40.0),
        ];
        let consensus = MlSignalAggregator::new().aggregate(&rows).unwrap();
        assert!((consensus.avg_probability - 50.0).abs() < 1e-9);
        assert!((consensus.avg_accuracy - 60.0).abs() < 1e-9);
    }

    fn metrics_from(count: usize, signal: Signal) -> CalibrationMetrics {
        let as_of = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        let entries: Vec<PrivateRecommendation> = (0..count)
            .map(|i| PrivateRecommendation {
                timestamp: as_of - Duration::days((i % 10) as i64),
                asset: "Gold".to_string(),
                signal,
            })
            .collect();
        PrivateCalibrationEngine::new().compute_calibration_at(&entries, 30, as_of)
    }

    #[test]
    fn calibration_boosts_and_caps() {
        let rows = vec![row("Gold ($/oz)", "a", 80.0, 93.0)];
        let mut consensus = MlSignalAggregator::new().aggregate(&rows).unwrap();

        // 25 buy-heavy entries: boost 0.05, 10 distinct days -> adjustment 1.1,
        // bullish bias matches the Buy consensus.
        let metrics = metrics_from(25, Signal::Buy);
        MlSignalAggregator::new().apply_calibration(&mut consensus, &metrics, "Gold ($/oz)");

        assert!(consensus.calibration_applied);
        // 93 + 5 capped at 95
        assert!((consensus.avg_accuracy - 95.0).abs() < 1e-9);
        // 1.0 * 1.1 capped at 1.0
        assert!((consensus.consensus_strength - 1.0).abs() < 1e-9);
        // 80 * 1.05 = 84, under the cap
        assert!((consensus.avg_probability - 84.0).abs() < 1e-9);
    }

    #[test]
    fn bias_mismatch_leaves_probability_alone() {
        let rows = vec![row("Gold ($/oz)", "a", 20.0, 60.0)];
        let mut consensus = MlSignalAggregator::new().aggregate(&rows).unwrap();
        assert_eq!(consensus.consensus_signal, Signal::Sell);

        let metrics = metrics_from(12, Signal::Buy); // bullish bias vs Sell consensus
        MlSignalAggregator::new().apply_calibration(&mut consensus, &metrics, "Gold ($/oz)");

        assert!(consensus.calibration_applied);
        assert!((consensus.avg_probability - 20.0).abs() < 1e-9);
        // accuracy still boosted: 60 + 3
        assert!((consensus.avg_accuracy - 63.0).abs() < 1e-9);
    }

    #[test]
    fn zero_observation_metrics_are_a_no_op() {
        let rows = vec![row("Gold", "a", 80.0, 60.0)];
        let mut consensus = MlSignalAggregator::new().aggregate(&rows).unwrap();
        let before = consensus.clone();

        MlSignalAggregator::new().apply_calibration(
            &mut consensus,
            &CalibrationMetrics::neutral(),
            "Gold",
        );

        assert!(!consensus.calibration_applied);
        assert_eq!(consensus.avg_accuracy, before.avg_accuracy);
        assert_eq!(consensus.consensus_strength, before.consensus_strength);
    }
}
