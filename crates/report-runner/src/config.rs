use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    // Input tables (produced by the fetch collaborators)
    pub technical_csv: String,
    pub ml_csv: String,
    pub private_log_csv: String,
    pub performance_csv: String,
    pub positions_csv: String,

    // Persisted state
    pub history_csv: String,
    pub accuracy_log_csv: String,

    // Windows
    pub calibration_window_days: i64,   // 30
    pub accuracy_days_back: i64,        // 30

    // Pre-computed news impact scalar for the day
    pub news_impact: f64,
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            technical_csv: env::var("TECHNICAL_SIGNALS_CSV")
                .unwrap_or_else(|_| "data/technical_signals.csv".to_string()),
            ml_csv: env::var("ML_PREDICTIONS_CSV")
                .unwrap_or_else(|_| "data/ml_predictions.csv".to_string()),
            private_log_csv: env::var("PRIVATE_LOG_CSV")
                .unwrap_or_else(|_| "data/private_recommendations.csv".to_string()),
            performance_csv: env::var("PERFORMANCE_CSV")
                .unwrap_or_else(|_| "data/performance.csv".to_string()),
            positions_csv: env::var("POSITIONS_CSV")
                .unwrap_or_else(|_| "data/positions.csv".to_string()),

            history_csv: env::var("HISTORY_CSV")
                .unwrap_or_else(|_| "data/recommendation_history.csv".to_string()),
            accuracy_log_csv: env::var("ACCURACY_LOG_CSV")
                .unwrap_or_else(|_| "data/accuracy_log.csv".to_string()),

            calibration_window_days: env::var("CALIBRATION_WINDOW_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            accuracy_days_back: env::var("ACCURACY_DAYS_BACK")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,

            news_impact: env::var("NEWS_IMPACT")
                .unwrap_or_else(|_| "0.0".to_string())
                .parse()?,
        };

        Ok(config)
    }
}
