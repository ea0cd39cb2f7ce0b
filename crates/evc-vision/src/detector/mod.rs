//! Detector capability and its YOLOv8 implementation.
//!
//! A [`DetectorBackend`] turns a frame into engine-native [`RawDetection`]s:
//! class ids with pixel corner coordinates, and pose subjects with
//! normalized keypoints. Translating those into [`evc_models::Detection`]
//! records is the job of [`crate::adapter::DetectionAdapter`].

mod lazy;
mod postprocess;
mod yolo;

pub use lazy::LazyDetector;
pub use postprocess::{decode_objects, decode_poses, FrameScale, OutputLayout};
pub use yolo::YoloDetector;

use crate::error::VisionResult;
use crate::frame::Frame;

/// One keypoint as reported by a pose model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawKeypoint {
    /// Normalized x coordinate
    pub x: f32,
    /// Normalized y coordinate
    pub y: f32,
    pub confidence: f32,
}

impl RawKeypoint {
    /// True when coordinates and confidence are all finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.confidence.is_finite()
    }
}

/// Engine-native detector output.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDetection {
    /// Labeled object with `[x1, y1, x2, y2]` corners in frame pixels
    Object {
        class_id: usize,
        confidence: f32,
        corners: [f32; 4],
    },
    /// Pose subject with its aggregate score and ordered keypoints
    Pose {
        score: f32,
        keypoints: Vec<RawKeypoint>,
    },
}

/// Frame-level object/pose detector.
///
/// Implementations must be safe to share across threads; backends whose
/// inference is not reentrant serialize calls internally.
pub trait DetectorBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Run detection on a single frame.
    fn detect(&self, frame: &Frame) -> VisionResult<Vec<RawDetection>>;
}
