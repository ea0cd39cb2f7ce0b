//! Error types for frame acquisition and perception.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur while acquiring frames or running detection.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Unsupported video source type: {0}")]
    UnsupportedSource(String),

    #[error("Could not open video source: {0}")]
    SourceUnavailable(String),

    #[error("Failed to read frame from video source: {0}")]
    FrameUnreadable(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Detector returned unusable output: {0}")]
    InvalidOutput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VisionError {
    /// Create a source unavailable error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable(message.into())
    }

    /// Create a frame read error.
    pub fn frame_unreadable(message: impl Into<String>) -> Self {
        Self::FrameUnreadable(message.into())
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create an inference failure error.
    pub fn inference_failed(message: impl Into<String>) -> Self {
        Self::InferenceFailed(message.into())
    }

    /// Create an unusable-output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if the error came from the detector rather than the frame source.
    pub fn is_perception_error(&self) -> bool {
        matches!(
            self,
            VisionError::ModelNotFound(_)
                | VisionError::DetectorUnavailable(_)
                | VisionError::InferenceFailed(_)
                | VisionError::InvalidOutput(_)
        )
    }
}
