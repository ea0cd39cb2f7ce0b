//! YOLOv8 output decoding.
//!
//! Object models emit `[1, 4 + C, N]`: per candidate a center-format box
//! followed by `C` class scores. Pose models emit `[1, 5 + 3K, N]`: the box,
//! one person score, then `K` keypoint triples `(x, y, conf)`. All
//! coordinates are in model input pixels.

use ndarray::{Array2, ArrayView1};

use super::{RawDetection, RawKeypoint};
use crate::error::{VisionError, VisionResult};

/// Shape of a YOLOv8 output tensor after dropping the batch axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLayout {
    /// Values per candidate
    pub features: usize,
    /// Number of candidates
    pub candidates: usize,
}

impl OutputLayout {
    /// Validate `[1, features, candidates]` dims against the data length.
    pub fn from_dims(dims: &[i64], len: usize) -> VisionResult<Self> {
        let (features, candidates) = match dims {
            [1, features, candidates] if *features > 0 && *candidates >= 0 => {
                (*features as usize, *candidates as usize)
            }
            _ => {
                return Err(VisionError::invalid_output(format!(
                    "Unexpected output shape {:?}",
                    dims
                )))
            }
        };

        if features * candidates != len {
            return Err(VisionError::invalid_output(format!(
                "Unexpected output size: expected {}, got {}",
                features * candidates,
                len
            )));
        }

        Ok(Self { features, candidates })
    }

    /// Reshape `[features, candidates]` data into `[candidates, features]` rows.
    fn rows(&self, output: &[f32]) -> VisionResult<Array2<f32>> {
        let array = Array2::from_shape_vec((self.features, self.candidates), output.to_vec())
            .map_err(|e| VisionError::invalid_output(format!("Failed to reshape output: {}", e)))?;
        Ok(array.reversed_axes())
    }
}

/// Model-to-frame coordinate scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameScale {
    pub input_size: f32,
    pub frame_width: f32,
    pub frame_height: f32,
}

impl FrameScale {
    pub fn new(input_size: u32, frame_width: u32, frame_height: u32) -> Self {
        Self {
            input_size: input_size as f32,
            frame_width: frame_width as f32,
            frame_height: frame_height as f32,
        }
    }

    /// Convert a center-format model box into frame-pixel corners.
    fn corners(&self, row: &ArrayView1<f32>) -> [f32; 4] {
        let sx = self.frame_width / self.input_size;
        let sy = self.frame_height / self.input_size;
        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        [
            (cx - w / 2.0) * sx,
            (cy - h / 2.0) * sy,
            (cx + w / 2.0) * sx,
            (cy + h / 2.0) * sy,
        ]
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    class_id: usize,
    confidence: f32,
    corners: [f32; 4],
    keypoints: Vec<RawKeypoint>,
}

/// Decode an object model output into thresholded, NMS-filtered detections.
pub fn decode_objects(
    output: &[f32],
    layout: OutputLayout,
    scale: FrameScale,
    confidence_threshold: f32,
    nms_threshold: f32,
) -> VisionResult<Vec<RawDetection>> {
    if layout.features <= 4 {
        return Err(VisionError::invalid_output(format!(
            "Object output has no class scores ({} features)",
            layout.features
        )));
    }

    let rows = layout.rows(output)?;
    let mut candidates = Vec::new();

    for (index, row) in rows.rows().into_iter().enumerate() {
        ensure_finite(&row, index)?;

        let mut best_class = 0;
        let mut best_score = 0.0f32;
        for (class_id, &score) in row.iter().skip(4).enumerate() {
            if score > best_score {
                best_score = score;
                best_class = class_id;
            }
        }

        if best_score < confidence_threshold {
            continue;
        }

        candidates.push(Candidate {
            class_id: best_class,
            confidence: best_score,
            corners: scale.corners(&row),
            keypoints: Vec::new(),
        });
    }

    Ok(non_maximum_suppression(candidates, nms_threshold)
        .into_iter()
        .map(|c| RawDetection::Object {
            class_id: c.class_id,
            confidence: c.confidence,
            corners: c.corners,
        })
        .collect())
}

/// Decode a pose model output into one subject per surviving candidate.
pub fn decode_poses(
    output: &[f32],
    layout: OutputLayout,
    scale: FrameScale,
    confidence_threshold: f32,
    nms_threshold: f32,
) -> VisionResult<Vec<RawDetection>> {
    if layout.features < 5 || (layout.features - 5) % 3 != 0 {
        return Err(VisionError::invalid_output(format!(
            "Pose output has {} features, expected 5 + 3K",
            layout.features
        )));
    }
    let num_keypoints = (layout.features - 5) / 3;

    let rows = layout.rows(output)?;
    let mut candidates = Vec::new();

    for (index, row) in rows.rows().into_iter().enumerate() {
        ensure_finite(&row, index)?;

        let score = row[4];
        if score < confidence_threshold {
            continue;
        }

        let keypoints = (0..num_keypoints)
            .map(|k| {
                let base = 5 + k * 3;
                RawKeypoint {
                    x: row[base] / scale.input_size,
                    y: row[base + 1] / scale.input_size,
                    confidence: row[base + 2],
                }
            })
            .collect();

        candidates.push(Candidate {
            class_id: 0,
            confidence: score,
            corners: scale.corners(&row),
            keypoints,
        });
    }

    Ok(non_maximum_suppression(candidates, nms_threshold)
        .into_iter()
        .map(|c| RawDetection::Pose {
            score: c.confidence,
            keypoints: c.keypoints,
        })
        .collect())
}

/// A NaN or infinite value in any candidate means the model output is
/// unusable, not that the frame is empty.
fn ensure_finite(row: &ArrayView1<f32>, index: usize) -> VisionResult<()> {
    match row.iter().position(|v| !v.is_finite()) {
        Some(feature) => Err(VisionError::invalid_output(format!(
            "non-finite value {} in candidate {} feature {}",
            row[feature], index, feature
        ))),
        None => Ok(()),
    }
}

/// Greedy per-class NMS, highest confidence first.
fn non_maximum_suppression(mut candidates: Vec<Candidate>, threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let overlaps = keep.iter().any(|kept| {
            kept.class_id == candidate.class_id
                && iou(&kept.corners, &candidate.corners) > threshold
        });
        if !overlaps {
            keep.push(candidate);
        }
    }
    keep
}

/// Intersection over Union of two corner-format boxes.
fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let inter_w = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let inter_h = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let intersection = inter_w * inter_h;

    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build `[features, candidates]` data from per-candidate rows.
    fn column_major(rows: &[Vec<f32>]) -> Vec<f32> {
        let features = rows[0].len();
        let mut data = Vec::with_capacity(features * rows.len());
        for f in 0..features {
            for row in rows {
                data.push(row[f]);
            }
        }
        data
    }

    #[test]
    fn test_layout_validation() {
        assert!(OutputLayout::from_dims(&[1, 6, 2], 12).is_ok());
        assert!(OutputLayout::from_dims(&[1, 6, 2], 11).is_err());
        assert!(OutputLayout::from_dims(&[6, 2], 12).is_err());
    }

    #[test]
    fn test_decode_objects_threshold_and_scale() {
        // Two classes; model input 100px, frame 200x100.
        let rows = vec![
            vec![50.0, 50.0, 20.0, 10.0, 0.1, 0.9],
            vec![10.0, 10.0, 4.0, 4.0, 0.1, 0.1],
        ];
        let layout = OutputLayout::from_dims(&[1, 6, 2], 12).unwrap();
        let scale = FrameScale::new(100, 200, 100);

        let detections = decode_objects(&column_major(&rows), layout, scale, 0.25, 0.45).unwrap();
        assert_eq!(detections.len(), 1);
        match &detections[0] {
            RawDetection::Object { class_id, confidence, corners } => {
                assert_eq!(*class_id, 1);
                assert!((confidence - 0.9).abs() < 1e-6);
                assert_eq!(*corners, [80.0, 45.0, 120.0, 55.0]);
            }
            other => panic!("unexpected detection {:?}", other),
        }
    }

    #[test]
    fn test_nms_suppresses_same_class_overlap() {
        let rows = vec![
            vec![50.0, 50.0, 20.0, 20.0, 0.8],
            vec![51.0, 50.0, 20.0, 20.0, 0.7],
            vec![10.0, 10.0, 5.0, 5.0, 0.6],
        ];
        let layout = OutputLayout::from_dims(&[1, 5, 3], 15).unwrap();
        let scale = FrameScale::new(100, 100, 100);

        let detections = decode_objects(&column_major(&rows), layout, scale, 0.25, 0.45).unwrap();
        assert_eq!(detections.len(), 2);
    }

    #[test]
    fn test_decode_poses_normalizes_keypoints() {
        // One keypoint per subject: 5 + 3 features.
        let rows = vec![vec![50.0, 50.0, 20.0, 40.0, 0.8, 25.0, 75.0, 0.6]];
        let layout = OutputLayout::from_dims(&[1, 8, 1], 8).unwrap();
        let scale = FrameScale::new(100, 640, 480);

        let poses = decode_poses(&column_major(&rows), layout, scale, 0.25, 0.45).unwrap();
        match &poses[0] {
            RawDetection::Pose { score, keypoints } => {
                assert!((score - 0.8).abs() < 1e-6);
                assert_eq!(keypoints.len(), 1);
                assert!((keypoints[0].x - 0.25).abs() < 1e-6);
                assert!((keypoints[0].y - 0.75).abs() < 1e-6);
            }
            other => panic!("unexpected detection {:?}", other),
        }
    }

    #[test]
    fn test_decode_poses_rejects_bad_layout() {
        let layout = OutputLayout::from_dims(&[1, 7, 1], 7).unwrap();
        let scale = FrameScale::new(100, 100, 100);
        assert!(decode_poses(&[0.0; 7], layout, scale, 0.25, 0.45).is_err());
    }

    #[test]
    fn test_decode_objects_rejects_nan_tensor() {
        let layout = OutputLayout::from_dims(&[1, 6, 2], 12).unwrap();
        let scale = FrameScale::new(100, 100, 100);

        let result = decode_objects(&[f32::NAN; 12], layout, scale, 0.25, 0.45);
        assert!(matches!(result, Err(VisionError::InvalidOutput(_))));
    }

    #[test]
    fn test_decode_objects_rejects_infinite_box() {
        let rows = vec![
            vec![50.0, 50.0, 20.0, 10.0, 0.1, 0.9],
            vec![f32::INFINITY, 10.0, 4.0, 4.0, 0.1, 0.1],
        ];
        let layout = OutputLayout::from_dims(&[1, 6, 2], 12).unwrap();
        let scale = FrameScale::new(100, 100, 100);

        assert!(decode_objects(&column_major(&rows), layout, scale, 0.25, 0.45).is_err());
    }

    #[test]
    fn test_decode_poses_rejects_nan_score() {
        let rows = vec![vec![50.0, 50.0, 20.0, 40.0, f32::NAN, 25.0, 75.0, 0.6]];
        let layout = OutputLayout::from_dims(&[1, 8, 1], 8).unwrap();
        let scale = FrameScale::new(100, 640, 480);

        let result = decode_poses(&column_major(&rows), layout, scale, 0.25, 0.45);
        assert!(matches!(result, Err(VisionError::InvalidOutput(_))));
    }

    #[test]
    fn test_decode_poses_rejects_nan_keypoint() {
        let rows = vec![vec![50.0, 50.0, 20.0, 40.0, 0.8, f32::NAN, 75.0, 0.6]];
        let layout = OutputLayout::from_dims(&[1, 8, 1], 8).unwrap();
        let scale = FrameScale::new(100, 640, 480);

        assert!(decode_poses(&column_major(&rows), layout, scale, 0.25, 0.45).is_err());
    }

    #[test]
    fn test_iou_identical_and_disjoint() {
        let a = [0.0, 0.0, 10.0, 10.0];
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
        assert_eq!(iou(&a, &[20.0, 20.0, 30.0, 30.0]), 0.0);
    }
}
