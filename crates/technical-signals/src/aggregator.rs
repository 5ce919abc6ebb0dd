use serde::{Deserialize, Serialize};
use signal_core::{Signal, TechnicalConsensus};

/// Canonical technical indicator columns, as the signal source names them.
/// Aggregation restricts a row to these; anything else in the row is noise
/// (price columns, summary columns) unless none of these match at all.
pub const KNOWN_INDICATORS: [&str; 16] = [
    "RSI(14)",
    "STOCH(9,6)",
    "STOCHRSI(14)",
    "MACD(12,26)",
    "ADX(14)",
    "Williams %R",
    "CCI(14)",
    "ATR(14)",
    "Highs/Lows(14)",
    "Ultimate Oscillator",
    "ROC",
    "Bull/Bear Power(13)",
    "MA5",
    "MA10",
    "MA20",
    "MA50",
];

/// One indicator column of a technical source row. `signal` is None when
/// the upstream cell was missing or NaN; that counts as Hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorCell {
    pub indicator: String,
    pub signal: Option<Signal>,
}

/// One row of the technical signals table, keyed by the source's raw label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub asset_label: String,
    pub cells: Vec<IndicatorCell>,
}

pub struct TechnicalSignalAggregator;

impl Default for TechnicalSignalAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl TechnicalSignalAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Collapse one asset's indicator row into a consensus signal.
    ///
    /// Majority rule is strict: a side wins only when its count is greater
    /// than each of the other two; any tie falls back to Hold. Strength is
    /// the winning count over the number of indicators considered.
    pub fn aggregate(&self, row: &IndicatorRow) -> TechnicalConsensus {
        let selected = Self::select_cells(row);

        if selected.is_empty() {
            tracing::warn!(asset = %row.asset_label, "no indicator columns available, defaulting to HOLD");
            return TechnicalConsensus::absent();
        }

        let mut buy_count = 0usize;
        let mut sell_count = 0usize;
        let mut hold_count = 0usize;
        let mut indicator_signals = Vec::with_capacity(selected.len());

        for cell in &selected {
            let signal = cell.signal.unwrap_or(Signal::Hold);
            match signal {
                Signal::Buy => buy_count += 1,
                Signal::Sell => sell_count += 1,
                Signal::Hold => hold_count += 1,
            }
            indicator_signals.push((cell.indicator.clone(), signal));
        }

        let considered = selected.len();
        let final_signal = if buy_count > sell_count && buy_count > hold_count {
            Signal::Buy
        } else if sell_count > buy_count && sell_count > hold_count {
            Signal::Sell
        } else {
            Signal::Hold
        };

        let winning = match final_signal {
            Signal::Buy => buy_count,
            Signal::Sell => sell_count,
            Signal::Hold => hold_count,
        };

        tracing::debug!(
            asset = %row.asset_label,
            signal = %final_signal,
            buy = buy_count,
            sell = sell_count,
            hold = hold_count,
            "technical consensus"
        );

        TechnicalConsensus {
            final_signal,
            strength: winning as f64 / considered as f64,
            buy_count,
            sell_count,
            hold_count,
            indicator_signals,
        }
    }

    /// Restrict a row to the known indicator columns. When a schema change
    /// renames every column, fall back to the first 16 cells present so a
    /// drifted source still produces a consensus instead of nothing.
    fn select_cells(row: &IndicatorRow) -> Vec<IndicatorCell> {
        let known: Vec<IndicatorCell> = row
            .cells
            .iter()
            .filter(|c| KNOWN_INDICATORS.contains(&c.indicator.as_str()))
            .cloned()
            .collect();

        if !known.is_empty() {
            return known;
        }

        if !row.cells.is_empty() {
            tracing::warn!(
                asset = %row.asset_label,
                columns = row.cells.len(),
                "no known indicator columns matched, using first {} available",
                row.cells.len().min(KNOWN_INDICATORS.len())
            );
        }

        row.cells
            .iter()
            .take(KNOWN_INDICATORS.len())
            .cloned()
            .collect()
    }
}
