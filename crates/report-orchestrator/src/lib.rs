//! Report Orchestrator
//!
//! Runs one full report pass: technical and ML aggregation, private
//! calibration, cross-family comparison, history persistence, and the
//! plain-text rendering handed to the delivery collaborator. Every source
//! failure degrades per-asset; a pass always yields a report.

pub mod pipeline;
pub mod render;

pub use pipeline::{DailyReport, PipelineConfig, ReportInputs, ReportPipeline};
pub use render::{render_accuracy_report, render_daily_report};
