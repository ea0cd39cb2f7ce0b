//! Detection Adapter - normalizes detector output into detection records.
//!
//! The adapter is the only consumer of [`RawDetection`]. It maps class ids to
//! labels, turns corner coordinates into non-negative pixel boxes clamped to
//! the frame, and turns pose subjects into `"pose"` detections with named,
//! normalized keypoints.
//!
//! Degenerate geometry (inverted corners, boxes with no area after clamping)
//! is dropped. Non-finite scores or coordinates mean the detector produced
//! unusable output, which is an error rather than an empty result: an empty
//! list always means "frame analyzed, nothing found".

use std::sync::Arc;
use std::time::Instant;

use evc_models::{BoundingBox, Detection, PosePoint};
use tracing::{debug, warn};

use crate::detector::{DetectorBackend, RawDetection, RawKeypoint};
use crate::error::{VisionError, VisionResult};
use crate::frame::Frame;
use crate::labels::{keypoint_name, LabelSet};

/// Wraps a shared detector and normalizes its output.
#[derive(Clone)]
pub struct DetectionAdapter {
    detector: Arc<dyn DetectorBackend>,
    labels: LabelSet,
}

impl DetectionAdapter {
    /// Create an adapter over a shared detector.
    pub fn new(detector: Arc<dyn DetectorBackend>, labels: LabelSet) -> Self {
        Self { detector, labels }
    }

    /// The class labels used for object detections.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Detect and normalize all observations in a frame.
    pub fn detect(&self, frame: &Frame) -> VisionResult<Vec<Detection>> {
        let started = Instant::now();
        let raw = self.detector.detect(frame).map_err(|e| {
            if e.is_perception_error() {
                e
            } else {
                VisionError::inference_failed(e.to_string())
            }
        })?;
        metrics::histogram!("evc_detector_latency_seconds").record(started.elapsed().as_secs_f64());

        let raw_count = raw.len();
        let mut detections = Vec::with_capacity(raw_count);
        for raw_detection in raw {
            if let Some(detection) = self.normalize(raw_detection, frame)? {
                metrics::counter!("evc_detections_total", "type" => detection.label().to_string())
                    .increment(1);
                detections.push(detection);
            }
        }

        debug!(
            detector = self.detector.name(),
            raw = raw_count,
            kept = detections.len(),
            "Detections normalized"
        );
        Ok(detections)
    }

    /// Translate one raw result. `Ok(None)` means the result was discarded.
    pub fn normalize(&self, raw: RawDetection, frame: &Frame) -> VisionResult<Option<Detection>> {
        match raw {
            RawDetection::Object {
                class_id,
                confidence,
                corners,
            } => {
                if !confidence.is_finite() || corners.iter().any(|c| !c.is_finite()) {
                    return Err(VisionError::invalid_output(format!(
                        "non-finite object result for class {}",
                        class_id
                    )));
                }

                let label = self.labels.label(class_id);
                match clamp_box(corners, frame.width(), frame.height()) {
                    Some(bbox) => Ok(Some(Detection::object(label, confidence as f64, bbox))),
                    None => {
                        warn!(label = %label, ?corners, "Discarding degenerate box");
                        Ok(None)
                    }
                }
            }
            RawDetection::Pose { score, keypoints } => {
                if !score.is_finite() {
                    return Err(VisionError::invalid_output("non-finite pose score"));
                }
                if let Some(index) = keypoints.iter().position(|kp| !kp.is_finite()) {
                    return Err(VisionError::invalid_output(format!(
                        "non-finite pose keypoint {}",
                        keypoint_name(index)
                    )));
                }
                Ok(Some(Detection::pose(score as f64, name_keypoints(&keypoints))))
            }
        }
    }
}

/// Clamp `[x1, y1, x2, y2]` to the frame and convert to a pixel box.
///
/// Returns `None` for inverted corners or a box with no area.
fn clamp_box(corners: [f32; 4], frame_width: u32, frame_height: u32) -> Option<BoundingBox> {
    let [x1, y1, x2, y2] = corners;
    if x2 < x1 || y2 < y1 {
        return None;
    }

    let clamp_x = |v: f32| v.clamp(0.0, frame_width as f32) as u32;
    let clamp_y = |v: f32| v.clamp(0.0, frame_height as f32) as u32;

    let bbox = BoundingBox::from_corners(clamp_x(x1), clamp_y(y1), clamp_x(x2), clamp_y(y2))?;
    if bbox.is_empty() {
        None
    } else {
        Some(bbox)
    }
}

fn name_keypoints(keypoints: &[RawKeypoint]) -> Vec<PosePoint> {
    keypoints
        .iter()
        .enumerate()
        .map(|(index, kp)| {
            PosePoint::new(
                keypoint_name(index),
                kp.x as f64,
                kp.y as f64,
                kp.confidence as f64,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<RawDetection>);

    impl DetectorBackend for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn detect(&self, _frame: &Frame) -> VisionResult<Vec<RawDetection>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl DetectorBackend for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn detect(&self, _frame: &Frame) -> VisionResult<Vec<RawDetection>> {
            Err(VisionError::internal("session crashed"))
        }
    }

    fn frame() -> Frame {
        Frame::from_rgb(640, 480, vec![0; 640 * 480 * 3]).unwrap()
    }

    fn adapter(raw: Vec<RawDetection>) -> DetectionAdapter {
        DetectionAdapter::new(Arc::new(Fixed(raw)), LabelSet::from_names(["person", "fire"]))
    }

    #[test]
    fn test_object_box_from_corners() {
        let detections = adapter(vec![RawDetection::Object {
            class_id: 1,
            confidence: 0.9,
            corners: [10.0, 10.0, 60.0, 60.0],
        }])
        .detect(&frame())
        .unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label(), "fire");
        assert_eq!(detections[0].bbox(), Some(&BoundingBox::new(10, 10, 50, 50)));
        assert!((detections[0].confidence() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_box_clamped_to_frame() {
        let detections = adapter(vec![RawDetection::Object {
            class_id: 0,
            confidence: 0.7,
            corners: [-20.0, 400.0, 100.0, 900.0],
        }])
        .detect(&frame())
        .unwrap();

        assert_eq!(detections[0].bbox(), Some(&BoundingBox::new(0, 400, 100, 80)));
    }

    #[test]
    fn test_degenerate_boxes_discarded() {
        let detections = adapter(vec![
            RawDetection::Object {
                class_id: 0,
                confidence: 0.8,
                corners: [50.0, 50.0, 10.0, 90.0],
            },
            RawDetection::Object {
                class_id: 0,
                confidence: 0.8,
                corners: [700.0, 10.0, 800.0, 90.0],
            },
        ])
        .detect(&frame())
        .unwrap();

        assert!(detections.is_empty());
    }

    #[test]
    fn test_pose_detection_named_and_normalized() {
        let detections = adapter(vec![RawDetection::Pose {
            score: 0.66,
            keypoints: vec![
                RawKeypoint {
                    x: 0.5,
                    y: 0.25,
                    confidence: 0.9,
                },
                RawKeypoint {
                    x: 1.3,
                    y: -0.2,
                    confidence: 0.4,
                },
            ],
        }])
        .detect(&frame())
        .unwrap();

        match &detections[0] {
            Detection::Pose(pose) => {
                assert!((pose.confidence - 0.66).abs() < 1e-6);
                assert_eq!(pose.pose["nose"].x, 0.5);
                assert_eq!(pose.pose["left_eye"].x, 1.0);
                assert_eq!(pose.pose["left_eye"].y, 0.0);
            }
            other => panic!("expected pose, got {:?}", other),
        }
        assert_eq!(detections[0].label(), "pose");
    }

    #[test]
    fn test_empty_output_is_not_an_error() {
        assert!(adapter(Vec::new()).detect(&frame()).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_output_is_perception_failure() {
        let err = adapter(vec![RawDetection::Object {
            class_id: 0,
            confidence: f32::NAN,
            corners: [0.0, 0.0, 10.0, 10.0],
        }])
        .detect(&frame())
        .unwrap_err();

        assert!(matches!(err, VisionError::InvalidOutput(_)));
    }

    #[test]
    fn test_non_finite_keypoint_is_perception_failure() {
        let err = adapter(vec![RawDetection::Pose {
            score: 0.9,
            keypoints: vec![RawKeypoint {
                x: f32::NAN,
                y: 0.5,
                confidence: f32::NAN,
            }],
        }])
        .detect(&frame())
        .unwrap_err();

        assert!(matches!(err, VisionError::InvalidOutput(_)));
        assert!(err.to_string().contains("nose"));
    }

    #[test]
    fn test_detector_failure_propagates() {
        let adapter = DetectionAdapter::new(Arc::new(Broken), LabelSet::coco());
        let err = adapter.detect(&frame()).unwrap_err();
        assert!(err.is_perception_error());
        assert!(err.to_string().contains("session crashed"));
    }
}
