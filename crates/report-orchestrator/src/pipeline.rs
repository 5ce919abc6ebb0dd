use calibration_engine::{CalibrationMetrics, PrivateCalibrationEngine, PrivateRecommendation};
use chrono::{DateTime, NaiveDate, Utc};
use ml_signals::{MlSignalAggregator, ModelRow};
use portfolio_insights::{Position, PortfolioInsights};
use recommendation_history::RecommendationHistoryStore;
use serde::{Deserialize, Serialize};
use signal_comparator::SignalComparator;
use signal_core::{
    AssetComparison, MlConsensus, RecommendationRecord, TechnicalConsensus,
};
use technical_signals::{IndicatorRow, TechnicalSignalAggregator};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Trailing window (days) of private history fed to calibration
    pub calibration_window_days: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            calibration_window_days: 30,
        }
    }
}

/// Fully-materialized inputs for one report pass. `None` for a source
/// means the collaborator could not provide it at all, as opposed to an
/// empty table.
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    pub technical_rows: Option<Vec<IndicatorRow>>,
    pub model_rows: Option<Vec<ModelRow>>,
    pub private_log: Vec<PrivateRecommendation>,
    pub positions: Vec<Position>,
    /// Pre-computed news impact scalar; folded into persisted records only
    pub news_impact: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub comparisons: Vec<AssetComparison>,
    pub technical_consensus: HashMap<String, TechnicalConsensus>,
    pub ml_consensus: HashMap<String, MlConsensus>,
    pub calibration: CalibrationMetrics,
    pub portfolio: Option<PortfolioInsights>,
    pub news_impact: f64,
    /// False when the day's snapshot could not be persisted
    pub persisted: bool,
}

pub struct ReportPipeline {
    technical: TechnicalSignalAggregator,
    ml: MlSignalAggregator,
    calibration: PrivateCalibrationEngine,
    comparator: SignalComparator,
    history: RecommendationHistoryStore,
    config: PipelineConfig,
}

impl ReportPipeline {
    pub fn new(history: RecommendationHistoryStore, config: PipelineConfig) -> Self {
        Self {
            technical: TechnicalSignalAggregator::new(),
            ml: MlSignalAggregator::new(),
            calibration: PrivateCalibrationEngine::new(),
            comparator: SignalComparator::new(),
            history,
            config,
        }
    }

    pub fn history(&self) -> &RecommendationHistoryStore {
        &self.history
    }

    /// One report pass, start to finish. Never fails: absent sources
    /// degrade to Hold/0 per asset and a persistence error is logged and
    /// reflected in `persisted`, not raised.
    pub fn run(&self, inputs: &ReportInputs) -> DailyReport {
        let generated_at = Utc::now();
        let date = generated_at.date_naive();

        let technical_consensus = self.aggregate_technical(inputs);
        let mut ml_consensus = self.aggregate_ml(inputs);

        let calibration = self
            .calibration
            .compute_calibration(&inputs.private_log, self.config.calibration_window_days);
        if calibration.has_observations() {
            for (label, consensus) in ml_consensus.iter_mut() {
                self.ml.apply_calibration(consensus, &calibration, label);
            }
        }

        let comparisons = self.comparator.compare(&technical_consensus, &ml_consensus);

        let records = self.build_records(date, generated_at, &comparisons, &ml_consensus, inputs);
        let persisted = match self.history.append_daily(date, &records) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist daily recommendations, report continues");
                false
            }
        };

        let portfolio = if inputs.positions.is_empty() {
            None
        } else {
            Some(portfolio_insights::analyze(&inputs.positions))
        };

        DailyReport {
            date,
            generated_at,
            comparisons,
            technical_consensus,
            ml_consensus,
            calibration,
            portfolio,
            news_impact: inputs.news_impact,
            persisted,
        }
    }

    fn aggregate_technical(&self, inputs: &ReportInputs) -> HashMap<String, TechnicalConsensus> {
        let Some(rows) = &inputs.technical_rows else {
            tracing::warn!("technical source absent, skipping technical analysis");
            return HashMap::new();
        };
        rows.iter()
            .map(|row| (row.asset_label.clone(), self.technical.aggregate(row)))
            .collect()
    }

    fn aggregate_ml(&self, inputs: &ReportInputs) -> HashMap<String, MlConsensus> {
        let Some(rows) = &inputs.model_rows else {
            tracing::warn!("ml source absent, skipping ml analysis");
            return HashMap::new();
        };

        let mut grouped: HashMap<String, Vec<ModelRow>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.asset_label.clone())
                .or_default()
                .push(row.clone());
        }

        grouped
            .into_iter()
            .filter_map(|(label, rows)| self.ml.aggregate(&rows).map(|c| (label, c)))
            .collect()
    }

    /// Flatten comparisons plus per-asset ML extras into persisted rows.
    fn build_records(
        &self,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
        comparisons: &[AssetComparison],
        ml_consensus: &HashMap<String, MlConsensus>,
        inputs: &ReportInputs,
    ) -> Vec<RecommendationRecord> {
        comparisons
            .iter()
            .map(|cmp| {
                let ml_entry = self.comparator.resolve_entry(ml_consensus, cmp.asset);
                RecommendationRecord {
                    date,
                    timestamp,
                    asset: cmp.asset.display_name().to_string(),
                    technical_signal: cmp.technical_signal,
                    technical_strength: cmp.technical_strength,
                    ml_signal: cmp.ml_signal,
                    ml_strength: cmp.ml_strength,
                    ml_accuracy: ml_entry.map(|m| m.avg_accuracy).unwrap_or(0.0),
                    ml_probability: ml_entry.map(|m| m.avg_probability).unwrap_or(0.0),
                    agreement: cmp.agreement,
                    recommendation: cmp.recommendation.label(),
                    confidence: cmp.recommendation.tier(),
                    news_impact: inputs.news_impact,
                }
            })
            .collect()
    }
}
