//! Perception configuration.

/// Default object detection model location.
pub const DEFAULT_MODEL_PATH: &str = "models/yolov8n.onnx";

/// Configuration for frame capture and detection.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionConfig {
    /// Path to the YOLOv8 object detection ONNX model
    pub model_path: String,
    /// Optional path to a YOLOv8-pose ONNX model
    pub pose_model_path: Option<String>,
    /// Optional newline-separated class names (defaults to COCO)
    pub labels_path: Option<String>,
    /// Minimum raw score kept by the detector
    pub confidence_threshold: f32,
    /// IoU threshold for NMS
    pub nms_threshold: f32,
    /// Model input size (square)
    pub input_size: u32,
    /// Webcam device index
    pub webcam_index: i32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model_path: DEFAULT_MODEL_PATH.to_string(),
            pose_model_path: None,
            labels_path: None,
            confidence_threshold: 0.25,
            nms_threshold: 0.45,
            input_size: 640,
            webcam_index: 0,
        }
    }
}

impl VisionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: std::env::var("EVC_MODEL_PATH").unwrap_or(defaults.model_path),
            pose_model_path: std::env::var("EVC_POSE_MODEL_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            labels_path: std::env::var("EVC_LABELS_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            confidence_threshold: std::env::var("EVC_DETECT_CONFIDENCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v: &f32| (0.0..=1.0).contains(v))
                .unwrap_or(defaults.confidence_threshold),
            nms_threshold: std::env::var("EVC_NMS_IOU")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v: &f32| (0.0..=1.0).contains(v))
                .unwrap_or(defaults.nms_threshold),
            input_size: std::env::var("EVC_INPUT_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v: &u32| *v > 0)
                .unwrap_or(defaults.input_size),
            webcam_index: std::env::var("EVC_WEBCAM_INDEX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.webcam_index),
        }
    }
}
