use crate::pipeline::DailyReport;
use accuracy_tracker::AccuracyReport;
use signal_core::Signal;
use std::fmt::Write;

fn signal_marker(signal: Signal) -> &'static str {
    match signal {
        Signal::Buy => "▲",
        Signal::Sell => "▼",
        Signal::Hold => "•",
    }
}

/// Render the day's comparison table as plain text for the messaging
/// collaborator. Layout only; every number comes from the pipeline.
pub fn render_daily_report(report: &DailyReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "MARKET SIGNALS {}", report.date.format("%Y-%m-%d"));
    let _ = writeln!(out, "{}", "=".repeat(40));

    for cmp in &report.comparisons {
        let _ = writeln!(out, "\n{} {}", signal_marker(cmp.recommendation.scored_signal()), cmp.asset);
        let _ = writeln!(
            out,
            "  Technical: {:<4} ({:>3.0}%)   ML: {:<4} ({:>3.0}%)",
            cmp.technical_signal.label(),
            cmp.technical_strength * 100.0,
            cmp.ml_signal.label(),
            cmp.ml_strength * 100.0,
        );
        let agreement = if cmp.agreement { "agree" } else { "DIVERGE" };
        let _ = writeln!(
            out,
            "  Verdict:   {} [{}], sources {}",
            cmp.recommendation.label(),
            cmp.recommendation.tier().label(),
            agreement,
        );
    }

    if report.calibration.has_observations() {
        let _ = writeln!(
            out,
            "\nCalibration: {} private recommendations over {} days (boost +{:.0}pp, confidence x{:.1})",
            report.calibration.total_recommendations,
            report.calibration.distinct_days,
            report.calibration.accuracy_boost * 100.0,
            report.calibration.confidence_adjustment,
        );
    }

    if let Some(portfolio) = &report.portfolio {
        let _ = writeln!(out, "\nPORTFOLIO: {}", portfolio.verdict.label());
        for weight in &portfolio.weights {
            let _ = writeln!(
                out,
                "  {:<14} {:>5.1}%",
                weight.asset, weight.weight_percent
            );
        }
        for warning in &portfolio.warnings {
            let _ = writeln!(out, "  ! {warning}");
        }
    }

    out
}

/// Render an accuracy report section.
pub fn render_accuracy_report(report: &AccuracyReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "ACCURACY last {} days: {}/{} correct ({:.1}%)",
        report.period_days,
        report.correct_recommendations,
        report.total_recommendations,
        report.accuracy_pct,
    );

    let mut assets: Vec<_> = report.per_asset.iter().collect();
    assets.sort_by(|a, b| a.0.cmp(b.0));
    for (asset, stats) in assets {
        let _ = writeln!(
            out,
            "  {:<14} {}/{} ({:.0}%)",
            asset, stats.correct, stats.total, stats.accuracy_pct
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use accuracy_tracker::AssetAccuracy;
    use calibration_engine::CalibrationMetrics;
    use chrono::Utc;
    use signal_core::{AssetComparison, CanonicalAsset, Recommendation};
    use std::collections::HashMap;

    fn sample_report() -> DailyReport {
        DailyReport {
            date: Utc::now().date_naive(),
            generated_at: Utc::now(),
            comparisons: vec![AssetComparison {
                asset: CanonicalAsset::Gold,
                technical_signal: Signal::Buy,
                technical_strength: 0.8,
                ml_signal: Signal::Buy,
                ml_strength: 0.7,
                agreement: true,
                recommendation: Recommendation::Strong(Signal::Buy),
            }],
            technical_consensus: HashMap::new(),
            ml_consensus: HashMap::new(),
            calibration: CalibrationMetrics::neutral(),
            portfolio: None,
            news_impact: 0.0,
            persisted: true,
        }
    }

    #[test]
    fn daily_report_mentions_verdicts() {
        let text = render_daily_report(&sample_report());
        assert!(text.contains("Gold"));
        assert!(text.contains("STRONG BUY"));
        assert!(text.contains("[HIGH]"));
        assert!(text.contains("agree"));
        // neutral calibration stays out of the report
        assert!(!text.contains("Calibration"));
    }

    #[test]
    fn accuracy_report_lists_assets_sorted() {
        let mut per_asset = HashMap::new();
        per_asset.insert(
            "Gold".to_string(),
            AssetAccuracy {
                total: 4,
                correct: 3,
                accuracy_pct: 75.0,
            },
        );
        per_asset.insert(
            "Bitcoin".to_string(),
            AssetAccuracy {
                total: 2,
                correct: 1,
                accuracy_pct: 50.0,
            },
        );
        let report = AccuracyReport {
            generated_at: Utc::now(),
            period_days: 30,
            total_recommendations: 6,
            correct_recommendations: 4,
            accuracy_pct: 66.7,
            per_asset,
        };
        let text = render_accuracy_report(&report);
        assert!(text.contains("4/6"));
        let bitcoin_pos = text.find("Bitcoin").unwrap();
        let gold_pos = text.find("Gold").unwrap();
        assert!(bitcoin_pos < gold_pos);
    }
}
