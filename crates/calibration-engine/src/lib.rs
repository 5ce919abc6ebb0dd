//! Private Calibration Engine
//!
//! Derives aggregate adjustment factors (accuracy boost, confidence
//! multiplier, per-asset directional bias) from a private historical
//! recommendation log. Strict one-way data flow: raw private rows enter,
//! only scalar aggregates leave, and `CalibrationMetrics` structurally
//! cannot carry a `PrivateRecommendation`.

pub mod engine;

pub use engine::{
    remap_to_private, AssetBias, CalibrationMetrics, PrivateCalibrationEngine,
    PrivateRecommendation, PRIVATE_ASSETS,
};
