//! Portfolio diversification heuristics.
//!
//! Pure, stateless helpers over (asset, value) positions. No persistence,
//! no market data. Feeds the report's portfolio section.

use serde::{Deserialize, Serialize};

/// A single holding valued in the portfolio's base currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub asset: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingWeight {
    pub asset: String,
    pub weight_percent: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiversificationVerdict {
    WellDiversified,
    Moderate,
    Concentrated,
}

impl DiversificationVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            DiversificationVerdict::WellDiversified => "well diversified",
            DiversificationVerdict::Moderate => "moderately concentrated",
            DiversificationVerdict::Concentrated => "concentrated",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInsights {
    pub total_value: f64,
    /// Sorted by weight descending
    pub weights: Vec<HoldingWeight>,
    /// Sum of squared weight fractions; 1/n for an equal-weight portfolio
    pub herfindahl_index: f64,
    pub top_weight_percent: f64,
    pub verdict: DiversificationVerdict,
    pub warnings: Vec<String>,
}

/// HHI over weight fractions. 0.0 for an empty portfolio.
pub fn herfindahl_index(weight_fractions: &[f64]) -> f64 {
    weight_fractions.iter().map(|w| w * w).sum()
}

const HHI_MODERATE: f64 = 0.35;
const HHI_CONCENTRATED: f64 = 0.55;
const TOP_WEIGHT_WARN_PCT: f64 = 40.0;

/// Compute allocation weights and coarse concentration heuristics.
pub fn analyze(positions: &[Position]) -> PortfolioInsights {
    let total_value: f64 = positions.iter().map(|p| p.value.max(0.0)).sum();

    let mut weights: Vec<HoldingWeight> = positions
        .iter()
        .filter(|p| p.value > 0.0)
        .map(|p| HoldingWeight {
            asset: p.asset.clone(),
            weight_percent: if total_value > 0.0 {
                p.value / total_value * 100.0
            } else {
                0.0
            },
            value: p.value,
        })
        .collect();
    weights.sort_by(|a, b| {
        b.weight_percent
            .partial_cmp(&a.weight_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let fractions: Vec<f64> = weights.iter().map(|w| w.weight_percent / 100.0).collect();
    let hhi = herfindahl_index(&fractions);
    let top_weight_percent = weights.first().map(|w| w.weight_percent).unwrap_or(0.0);

    let verdict = if hhi >= HHI_CONCENTRATED {
        DiversificationVerdict::Concentrated
    } else if hhi >= HHI_MODERATE {
        DiversificationVerdict::Moderate
    } else {
        DiversificationVerdict::WellDiversified
    };

    let mut warnings = Vec::new();
    if let Some(top) = weights.first() {
        if top.weight_percent > TOP_WEIGHT_WARN_PCT {
            warnings.push(format!(
                "{} is {:.1}% of the portfolio (above {TOP_WEIGHT_WARN_PCT:.0}%)",
                top.asset, top.weight_percent
            ));
        }
    }
    if weights.len() == 1 {
        warnings.push("single-position portfolio".to_string());
    }

    PortfolioInsights {
        total_value,
        weights,
        herfindahl_index: hhi,
        top_weight_percent,
        verdict,
        warnings,
    }
}
