//! Perception stage for Emergency Vision Copilot.
//!
//! This crate provides:
//! - Frame acquisition from webcams, files and uploaded bytes
//! - A YOLOv8 object/pose detector on ONNX Runtime
//! - An initialize-once detector handle for process-wide sharing
//! - The detection adapter that normalizes raw output into
//!   [`evc_models::Detection`] records

pub mod adapter;
pub mod config;
pub mod detector;
pub mod error;
pub mod frame;
pub mod labels;
pub mod source;

pub use adapter::DetectionAdapter;
pub use config::VisionConfig;
pub use detector::{DetectorBackend, LazyDetector, RawDetection, RawKeypoint, YoloDetector};
pub use error::{VisionError, VisionResult};
pub use frame::Frame;
pub use labels::{LabelSet, COCO_CLASSES, COCO_KEYPOINTS};
pub use source::{FrameGrabber, MediaFrameGrabber, SourceDescriptor};
