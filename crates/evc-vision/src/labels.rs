//! Class and keypoint names for YOLOv8 models.

use std::path::Path;

use crate::error::{VisionError, VisionResult};

/// COCO class names (80 classes).
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck",
    "boat", "traffic light", "fire hydrant", "stop sign", "parking meter", "bench",
    "bird", "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra",
    "giraffe", "backpack", "umbrella", "handbag", "tie", "suitcase", "frisbee",
    "skis", "snowboard", "sports ball", "kite", "baseball bat", "baseball glove",
    "skateboard", "surfboard", "tennis racket", "bottle", "wine glass", "cup",
    "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink",
    "refrigerator", "book", "clock", "vase", "scissors", "teddy bear", "hair drier",
    "toothbrush",
];

/// COCO keypoint names in YOLOv8-pose output order.
pub const COCO_KEYPOINTS: &[&str] = &[
    "nose", "left_eye", "right_eye", "left_ear", "right_ear",
    "left_shoulder", "right_shoulder", "left_elbow", "right_elbow",
    "left_wrist", "right_wrist", "left_hip", "right_hip",
    "left_knee", "right_knee", "left_ankle", "right_ankle",
];

/// Keypoint name for an output index; unnamed indices get `point_{n}`.
pub fn keypoint_name(index: usize) -> String {
    COCO_KEYPOINTS
        .get(index)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("point_{}", index))
}

/// Class id to label mapping for an object model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
}

impl LabelSet {
    /// The 80 COCO classes.
    pub fn coco() -> Self {
        Self::from_names(COCO_CLASSES.iter().copied())
    }

    /// Build from an ordered list of names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Load newline-separated names; blank lines and `#` comments are skipped.
    pub fn from_file(path: impl AsRef<Path>) -> VisionResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let labels = Self::from_names(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        );
        if labels.is_empty() {
            return Err(VisionError::internal(format!(
                "Label file {} contains no class names",
                path.display()
            )));
        }
        Ok(labels)
    }

    /// Label for a class id; unknown ids become `class_{id}`.
    pub fn label(&self, class_id: usize) -> String {
        self.names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", class_id))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::coco()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coco_classes() {
        assert_eq!(COCO_CLASSES[0], "person");
        assert_eq!(COCO_CLASSES.len(), 80);
        assert_eq!(COCO_KEYPOINTS.len(), 17);
    }

    #[test]
    fn test_unknown_class_label() {
        let labels = LabelSet::from_names(["fire", "smoke"]);
        assert_eq!(labels.label(1), "smoke");
        assert_eq!(labels.label(7), "class_7");
    }

    #[test]
    fn test_keypoint_name_fallback() {
        assert_eq!(keypoint_name(0), "nose");
        assert_eq!(keypoint_name(30), "point_30");
    }

    #[test]
    fn test_from_file_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "# hazard model\nfire\n\nsmoke\n").unwrap();

        let labels = LabelSet::from_file(&path).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.label(0), "fire");
    }

    #[test]
    fn test_from_empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "# nothing\n").unwrap();
        assert!(LabelSet::from_file(&path).is_err());
    }
}
