use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete trading signal shared by every source family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Fixed enumeration order used for every vote tie-break.
    /// Buy wins over Sell wins over Hold on an exact tie; map iteration
    /// order must never decide a consensus.
    pub const VOTE_ORDER: [Signal; 3] = [Signal::Buy, Signal::Sell, Signal::Hold];

    pub fn label(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        }
    }

    /// Parse a raw cell value ("Buy", "BUY", "sell", ...). Anything else is None.
    pub fn parse_label(raw: &str) -> Option<Signal> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(Signal::Buy),
            "SELL" => Some(Signal::Sell),
            "HOLD" | "NEUTRAL" => Some(Signal::Hold),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the four tracked instruments, independent of any source's naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalAsset {
    DollarIndex,
    Sp500,
    Gold,
    Bitcoin,
}

impl CanonicalAsset {
    /// Every comparison result carries exactly these four, in this order.
    pub const ALL: [CanonicalAsset; 4] = [
        CanonicalAsset::DollarIndex,
        CanonicalAsset::Sp500,
        CanonicalAsset::Gold,
        CanonicalAsset::Bitcoin,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            CanonicalAsset::DollarIndex => "Dollar Index",
            CanonicalAsset::Sp500 => "S&P 500",
            CanonicalAsset::Gold => "Gold",
            CanonicalAsset::Bitcoin => "Bitcoin",
        }
    }
}

impl fmt::Display for CanonicalAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Per-asset consensus over the technical indicator table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalConsensus {
    pub final_signal: Signal,
    /// Winning vote count / indicators considered, in [0, 1]
    pub strength: f64,
    pub buy_count: usize,
    pub sell_count: usize,
    pub hold_count: usize,
    pub indicator_signals: Vec<(String, Signal)>,
}

impl TechnicalConsensus {
    /// Degraded placeholder used when the technical source has nothing for an asset.
    pub fn absent() -> Self {
        Self {
            final_signal: Signal::Hold,
            strength: 0.0,
            buy_count: 0,
            sell_count: 0,
            hold_count: 0,
            indicator_signals: Vec::new(),
        }
    }
}

/// One model's contribution to an asset's ML consensus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSignal {
    pub model: String,
    pub signal: Signal,
    /// 0-100
    pub probability: f64,
    /// 0-100
    pub accuracy: f64,
}

/// Per-asset consensus over all ML model rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlConsensus {
    pub consensus_signal: Signal,
    /// Winning vote count / total models, in [0, 1]
    pub consensus_strength: f64,
    /// Arithmetic mean across models, 0-100
    pub avg_probability: f64,
    /// Arithmetic mean across models, 0-100
    pub avg_accuracy: f64,
    pub per_model: Vec<ModelSignal>,
    pub calibration_applied: bool,
}

/// Confidence tier attached to a combined recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "HIGH",
            ConfidenceTier::Medium => "MEDIUM",
            ConfidenceTier::Low => "LOW",
        }
    }
}

/// Combined verdict derived from the technical/ML agreement check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    /// Both families agree and both strengths clear the conviction bar
    Strong(Signal),
    /// Both families agree but at least one side is weak
    Moderate(Signal),
    /// The families disagree
    Caution,
}

impl Recommendation {
    pub fn label(&self) -> String {
        match self {
            Recommendation::Strong(s) => format!("STRONG {}", s.label()),
            Recommendation::Moderate(s) => s.label().to_string(),
            Recommendation::Caution => "CAUTION".to_string(),
        }
    }

    pub fn tier(&self) -> ConfidenceTier {
        match self {
            Recommendation::Strong(_) => ConfidenceTier::High,
            Recommendation::Moderate(_) => ConfidenceTier::Medium,
            Recommendation::Caution => ConfidenceTier::Low,
        }
    }

    /// The direction this recommendation is accountable for when scored
    /// against realized returns. CAUTION rows are scored as Hold.
    pub fn scored_signal(&self) -> Signal {
        match self {
            Recommendation::Strong(s) | Recommendation::Moderate(s) => *s,
            Recommendation::Caution => Signal::Hold,
        }
    }
}

/// Merged per-asset view of both signal families
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetComparison {
    pub asset: CanonicalAsset,
    pub technical_signal: Signal,
    pub technical_strength: f64,
    pub ml_signal: Signal,
    pub ml_strength: f64,
    pub agreement: bool,
    pub recommendation: Recommendation,
}

/// Persisted daily snapshot row, one per (date, asset)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub asset: String,
    pub technical_signal: Signal,
    pub technical_strength: f64,
    pub ml_signal: Signal,
    pub ml_strength: f64,
    pub ml_accuracy: f64,
    pub ml_probability: f64,
    pub agreement: bool,
    pub recommendation: String,
    pub confidence: ConfidenceTier,
    pub news_impact: f64,
}

impl RecommendationRecord {
    /// Direction the persisted recommendation is scored on. Parses the
    /// stored label so older rows written by previous runs stay scoreable.
    pub fn scored_signal(&self) -> Signal {
        let label = self.recommendation.to_ascii_uppercase();
        if label.ends_with("BUY") {
            Signal::Buy
        } else if label.ends_with("SELL") {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}
