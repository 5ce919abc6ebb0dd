use anyhow::Result;
use recommendation_history::RecommendationHistoryStore;
use accuracy_tracker::{AccuracyEvaluator, AccuracyLog};
use report_orchestrator::{
    render_accuracy_report, render_daily_report, PipelineConfig, ReportInputs, ReportPipeline,
};

mod config;
mod sources;

use config::RunnerConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    tracing::info!("Starting MarketPulse report run");

    let config = RunnerConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  History file: {}", config.history_csv);
    tracing::info!("  Calibration window: {} days", config.calibration_window_days);
    tracing::info!("  Accuracy window: {} days", config.accuracy_days_back);

    // Inputs: each loader degrades to None/empty when a fetch collaborator
    // left nothing behind; the pipeline handles the rest per-asset.
    let technical_rows = sources::load_technical(&config.technical_csv)?;
    let model_rows = sources::load_models(&config.ml_csv)?;
    let private_log = sources::load_private_log(&config.private_log_csv)?;
    let positions = sources::load_positions(&config.positions_csv)?;

    let inputs = ReportInputs {
        technical_rows,
        model_rows,
        private_log,
        positions,
        news_impact: config.news_impact,
    };

    let pipeline = ReportPipeline::new(
        RecommendationHistoryStore::new(&config.history_csv),
        PipelineConfig {
            calibration_window_days: config.calibration_window_days,
        },
    );

    let report = pipeline.run(&inputs);
    if !report.persisted {
        tracing::warn!("daily snapshot was not persisted, accuracy history will have a gap");
    }

    // Delivery collaborators can ask for the structured form instead of text.
    let json_report = std::env::var("REPORT_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_daily_report(&report));
    }

    // Score past recommendations against realized performance.
    let performance = sources::load_performance(&config.performance_csv)?;
    let history = pipeline.history().load_all()?;
    let evaluator = AccuracyEvaluator::new();
    match evaluator.calculate_accuracy_report(&history, &performance, config.accuracy_days_back) {
        Some(accuracy) => {
            if json_report {
                println!("{}", serde_json::to_string_pretty(&accuracy)?);
            } else {
                println!("{}", render_accuracy_report(&accuracy));
            }
            let log = AccuracyLog::new(&config.accuracy_log_csv);
            if let Err(e) = log.append(&accuracy) {
                tracing::warn!(error = %e, "failed to append accuracy report");
            }
        }
        None => {
            tracing::info!("no scoreable recommendations yet, accuracy section skipped");
        }
    }

    tracing::info!("Report run complete");
    Ok(())
}
