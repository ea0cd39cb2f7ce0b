//! Normalized detection records.
//!
//! A [`Detection`] is either an object detection (label, confidence and a
//! bounding box) or a pose detection (aggregate score and named keypoints).
//! The two shapes are mutually exclusive, so evaluators never have to probe
//! for optional geometry.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::{clamp_unit, BoundingBox, PosePoint};

/// Label reported for every pose detection.
pub const POSE_LABEL: &str = "pose";

/// One labeled object with its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectDetection {
    /// Class label (e.g. `person`, `fire`)
    #[serde(rename = "type")]
    pub label: String,
    /// Detection confidence (0.0-1.0)
    pub confidence: f64,
    /// Bounding box in pixel coordinates
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

/// One detected subject's skeleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PoseDetection {
    /// Aggregate pose score for the subject (0.0-1.0)
    pub confidence: f64,
    /// Keypoints by name
    pub pose: BTreeMap<String, PosePoint>,
}

/// A single normalized observation from the perception stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Detection {
    Object(ObjectDetection),
    Pose(PoseDetection),
}

impl Detection {
    /// Create an object detection. Confidence is clamped to [0, 1].
    pub fn object(label: impl Into<String>, confidence: f64, bbox: BoundingBox) -> Self {
        Self::Object(ObjectDetection {
            label: label.into(),
            confidence: clamp_unit(confidence),
            bbox,
        })
    }

    /// Create a pose detection from its keypoints.
    pub fn pose(confidence: f64, keypoints: impl IntoIterator<Item = PosePoint>) -> Self {
        Self::Pose(PoseDetection {
            confidence: clamp_unit(confidence),
            pose: keypoints
                .into_iter()
                .map(|point| (point.name.clone(), point))
                .collect(),
        })
    }

    /// Detection type label used for evaluator routing.
    pub fn label(&self) -> &str {
        match self {
            Detection::Object(object) => &object.label,
            Detection::Pose(_) => POSE_LABEL,
        }
    }

    /// Detection confidence.
    pub fn confidence(&self) -> f64 {
        match self {
            Detection::Object(object) => object.confidence,
            Detection::Pose(pose) => pose.confidence,
        }
    }

    /// Bounding box, if this is an object detection.
    pub fn bbox(&self) -> Option<&BoundingBox> {
        match self {
            Detection::Object(object) => Some(&object.bbox),
            Detection::Pose(_) => None,
        }
    }

    /// Object view, if this is an object detection.
    pub fn as_object(&self) -> Option<&ObjectDetection> {
        match self {
            Detection::Object(object) => Some(object),
            Detection::Pose(_) => None,
        }
    }
}
