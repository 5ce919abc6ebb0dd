use signal_core::{
    AssetAliasSet, AssetComparison, CanonicalAsset, MlConsensus, Recommendation, Signal,
    TechnicalConsensus,
};
use std::collections::HashMap;

/// Minimum strength on BOTH sides for an agreement to rate as strong.
pub const STRONG_MIN_STRENGTH: f64 = 0.6;

/// Merges the technical and ML consensus maps into one verdict per
/// canonical asset. Both maps are keyed by each source's raw labels, so
/// every lookup goes through alias resolution; found/missed is logged per
/// asset per source because silent name drift between sources is the main
/// failure mode of this layer.
pub struct SignalComparator {
    aliases: AssetAliasSet,
}

impl Default for SignalComparator {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalComparator {
    pub fn new() -> Self {
        Self {
            aliases: AssetAliasSet::default(),
        }
    }

    /// Always returns exactly one entry per canonical asset, in canonical
    /// order, regardless of what either source contained. A side with no
    /// resolvable entry contributes Hold at zero strength.
    pub fn compare(
        &self,
        technical: &HashMap<String, TechnicalConsensus>,
        ml: &HashMap<String, MlConsensus>,
    ) -> Vec<AssetComparison> {
        CanonicalAsset::ALL
            .iter()
            .map(|asset| {
                let tech_entry = self.resolve_entry(technical, *asset);
                let ml_entry = self.resolve_entry(ml, *asset);

                if tech_entry.is_none() {
                    tracing::warn!(asset = %asset, source = "technical", "asset missing from source, defaulting to HOLD");
                }
                if ml_entry.is_none() {
                    tracing::warn!(asset = %asset, source = "ml", "asset missing from source, defaulting to HOLD");
                }

                let (technical_signal, technical_strength) = tech_entry
                    .map(|t| (t.final_signal, t.strength))
                    .unwrap_or((Signal::Hold, 0.0));
                let (ml_signal, ml_strength) = ml_entry
                    .map(|m| (m.consensus_signal, m.consensus_strength))
                    .unwrap_or((Signal::Hold, 0.0));

                let agreement = technical_signal == ml_signal;
                let recommendation =
                    combined_recommendation(agreement, technical_signal, technical_strength, ml_strength);

                tracing::debug!(
                    asset = %asset,
                    technical = %technical_signal,
                    ml = %ml_signal,
                    agreement,
                    recommendation = %recommendation.label(),
                    "comparison"
                );

                AssetComparison {
                    asset: *asset,
                    technical_signal,
                    technical_strength,
                    ml_signal,
                    ml_strength,
                    agreement,
                    recommendation,
                }
            })
            .collect()
    }

    /// Find the entry of a raw-labelled source map that resolves to the
    /// given canonical asset. Exposed so the persistence layer can pull
    /// source extras (accuracy, probability) with the same lookup rules.
    pub fn resolve_entry<'a, T>(
        &self,
        source: &'a HashMap<String, T>,
        asset: CanonicalAsset,
    ) -> Option<&'a T> {
        source
            .iter()
            .find(|(label, _)| self.aliases.resolve(label) == Some(asset))
            .map(|(_, entry)| entry)
    }
}

/// Agreement with conviction on both sides rates STRONG/high; plain
/// agreement carries the signal at medium confidence; disagreement is
/// always CAUTION/low.
fn combined_recommendation(
    agreement: bool,
    signal: Signal,
    technical_strength: f64,
    ml_strength: f64,
) -> Recommendation {
    if !agreement {
        return Recommendation::Caution;
    }
    if technical_strength.min(ml_strength) >= STRONG_MIN_STRENGTH {
        Recommendation::Strong(signal)
    } else {
        Recommendation::Moderate(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::ConfidenceTier;

    fn tech(signal: Signal, strength: f64) -> TechnicalConsensus {
        TechnicalConsensus {
            final_signal: signal,
            strength,
            buy_count: 0,
            sell_count: 0,
            hold_count: 0,
            indicator_signals: Vec::new(),
        }
    }

    fn ml(signal: Signal, strength: f64) -> MlConsensus {
        MlConsensus {
            consensus_signal: signal,
            consensus_strength: strength,
            avg_probability: 50.0,
            avg_accuracy: 50.0,
            per_model: Vec::new(),
            calibration_applied: false,
        }
    }

    #[test]
    fn always_exactly_four_results_even_for_empty_sources() {
        let comparator = SignalComparator::new();
        let results = comparator.compare(&HashMap::new(), &HashMap::new());
        assert_eq!(results.len(), 4);
        for (result, asset) in results.iter().zip(CanonicalAsset::ALL) {
            assert_eq!(result.asset, asset);
            assert_eq!(result.technical_signal, Signal::Hold);
            assert_eq!(result.ml_signal, Signal::Hold);
            assert_eq!(result.technical_strength, 0.0);
            assert_eq!(result.ml_strength, 0.0);
            // Hold == Hold counts as agreement, weak on both sides
            assert!(result.agreement);
            assert_eq!(result.recommendation, Recommendation::Moderate(Signal::Hold));
        }
    }

    #[test]
    fn strong_agreement_above_conviction_bar() {
        let comparator = SignalComparator::new();
        let mut technical = HashMap::new();
        technical.insert("Bitcoin ($)".to_string(), tech(Signal::Buy, 0.8));
        let mut ml_map = HashMap::new();
        ml_map.insert("Bitcoin".to_string(), ml(Signal::Buy, 0.7));

        let results = comparator.compare(&technical, &ml_map);
        let bitcoin = results
            .iter()
            .find(|r| r.asset == CanonicalAsset::Bitcoin)
            .unwrap();
        assert!(bitcoin.agreement);
        assert_eq!(bitcoin.recommendation, Recommendation::Strong(Signal::Buy));
        assert_eq!(bitcoin.recommendation.label(), "STRONG BUY");
        assert_eq!(bitcoin.recommendation.tier(), ConfidenceTier::High);
    }

    #[test]
    fn weak_agreement_is_moderate() {
        let comparator = SignalComparator::new();
        let mut technical = HashMap::new();
        technical.insert("Gold".to_string(), tech(Signal::Buy, 0.8));
        let mut ml_map = HashMap::new();
        ml_map.insert("Gold ($/oz)".to_string(), ml(Signal::Buy, 0.5));

        let results = comparator.compare(&technical, &ml_map);
        let gold = results.iter().find(|r| r.asset == CanonicalAsset::Gold).unwrap();
        assert_eq!(gold.recommendation, Recommendation::Moderate(Signal::Buy));
        assert_eq!(gold.recommendation.tier(), ConfidenceTier::Medium);
    }

    #[test]
    fn disagreement_is_caution() {
        let comparator = SignalComparator::new();
        let mut technical = HashMap::new();
        technical.insert("S&P 500".to_string(), tech(Signal::Sell, 0.5));
        let mut ml_map = HashMap::new();
        ml_map.insert("S&P 500".to_string(), ml(Signal::Buy, 0.4));

        let results = comparator.compare(&technical, &ml_map);
        let spx = results.iter().find(|r| r.asset == CanonicalAsset::Sp500).unwrap();
        assert!(!spx.agreement);
        assert_eq!(spx.recommendation, Recommendation::Caution);
        assert_eq!(spx.recommendation.tier(), ConfidenceTier::Low);
    }

    #[test]
    fn one_sided_source_defaults_other_side_to_hold() {
        let comparator = SignalComparator::new();
        let mut technical = HashMap::new();
        technical.insert("Dollar Index".to_string(), tech(Signal::Sell, 0.9));

        let results = comparator.compare(&technical, &HashMap::new());
        let dxy = results
            .iter()
            .find(|r| r.asset == CanonicalAsset::DollarIndex)
            .unwrap();
        assert_eq!(dxy.technical_signal, Signal::Sell);
        assert_eq!(dxy.ml_signal, Signal::Hold);
        assert_eq!(dxy.ml_strength, 0.0);
        assert!(!dxy.agreement);
        assert_eq!(dxy.recommendation, Recommendation::Caution);
    }

    #[test]
    fn unresolvable_labels_are_ignored() {
        let comparator = SignalComparator::new();
        let mut technical = HashMap::new();
        technical.insert("Crude Oil".to_string(), tech(Signal::Buy, 1.0));

        let results = comparator.compare(&technical, &HashMap::new());
        assert!(results
            .iter()
            .all(|r| r.technical_signal == Signal::Hold && r.technical_strength == 0.0));
    }

    #[test]
    fn boundary_strength_exactly_point_six_is_strong() {
        let comparator = SignalComparator::new();
        let mut technical = HashMap::new();
        technical.insert("Gold".to_string(), tech(Signal::Sell, 0.6));
        let mut ml_map = HashMap::new();
        ml_map.insert("Gold".to_string(), ml(Signal::Sell, 0.6));

        let results = comparator.compare(&technical, &ml_map);
        let gold = results.iter().find(|r| r.asset == CanonicalAsset::Gold).unwrap();
        assert_eq!(gold.recommendation, Recommendation::Strong(Signal::Sell));
    }
}
