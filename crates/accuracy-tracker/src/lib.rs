pub mod evaluator;
pub mod log;

pub use evaluator::{
    AccuracyEvaluator, AccuracyReport, AssetAccuracy, PerformanceEntry, HOLD_BAND_PCT,
    MATURATION_DAYS,
};
pub use log::AccuracyLog;
