//! Shared data models for Emergency Vision Copilot.
//!
//! This crate provides Serde-serializable types for:
//! - Normalized detections produced by the perception stage
//! - Judgments, evidence and events produced by category evaluators
//! - The closed set of emergency event types and scene labels

pub mod detection;
pub mod event_type;
pub mod geometry;
pub mod judgment;

// Re-export common types
pub use detection::{Detection, ObjectDetection, PoseDetection, POSE_LABEL};
pub use event_type::{EventType, EventTypeParseError};
pub use geometry::{BoundingBox, PosePoint};
pub use judgment::{Event, Evidence, Judgment, Scene, FAILURE_SEVERITY, NEUTRAL_SEVERITY};
