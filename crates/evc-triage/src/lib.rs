//! Emergency triage for single video frames.
//!
//! This crate provides:
//! - Category evaluators for falls, fire, smoke, drowning and overdose
//! - The label-to-evaluator registry
//! - Max-severity arbitration
//! - The orchestrator that turns a frame source into one [`Judgment`]

pub mod arbitrator;
pub mod config;
pub mod error;
pub mod evaluators;
pub mod logging;
pub mod orchestrator;
pub mod registry;

pub use arbitrator::arbitrate;
pub use config::TriageConfig;
pub use error::{TriageError, TriageResult};
pub use evaluators::{CategoryEvaluator, Evaluator, FallEvaluator, ThresholdEvaluator};
pub use logging::{init_tracing, AnalysisLogger};
pub use orchestrator::{
    analyze_with_timeout, evaluate_isolated, route_with, Orchestrator, PipelineStage,
};
pub use registry::EvaluatorRegistry;

pub use evc_models::Judgment;
