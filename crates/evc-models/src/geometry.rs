//! Geometry primitives attached to detections and evidence.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates.
///
/// Serialized with the short `w`/`h` keys used by the judgment schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    /// Left edge x-coordinate
    pub x: u32,
    /// Top edge y-coordinate
    pub y: u32,
    /// Box width
    #[serde(rename = "w")]
    pub width: u32,
    /// Box height
    #[serde(rename = "h")]
    pub height: u32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a box from corner coordinates.
    ///
    /// Returns `None` when the corners are inverted.
    pub fn from_corners(x1: u32, y1: u32, x2: u32, y2: u32) -> Option<Self> {
        let width = x2.checked_sub(x1)?;
        let height = y2.checked_sub(y1)?;
        Some(Self::new(x1, y1, width, height))
    }

    /// Width divided by height, or `None` for a zero-height box.
    #[inline]
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }

    /// True when the box covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A single pose keypoint in normalized frame coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PosePoint {
    /// Keypoint name (e.g. `left_wrist`)
    pub name: String,
    /// X coordinate (0.0 = left, 1.0 = right)
    pub x: f64,
    /// Y coordinate (0.0 = top, 1.0 = bottom)
    pub y: f64,
    /// Keypoint visibility confidence (0.0-1.0)
    pub score: f64,
}

impl PosePoint {
    /// Create a keypoint, clamping coordinates and score to [0, 1].
    pub fn new(name: impl Into<String>, x: f64, y: f64, score: f64) -> Self {
        Self {
            name: name.into(),
            x: clamp_unit(x),
            y: clamp_unit(y),
            score: clamp_unit(score),
        }
    }
}

/// Clamp a value to the unit interval, mapping NaN to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
