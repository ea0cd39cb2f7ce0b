//! Pipeline error taxonomy.

use std::time::Duration;

use evc_models::EventType;
use evc_vision::VisionError;
use thiserror::Error;

pub type TriageResult<T> = Result<T, TriageError>;

#[derive(Debug, Error)]
pub enum TriageError {
    /// The frame could not be acquired.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[source] VisionError),

    /// The detector failed or returned unusable output.
    #[error("Perception failure: {0}")]
    PerceptionFailure(#[source] VisionError),

    /// A category evaluator panicked on well-formed input.
    #[error("Evaluator defect in {category}: {message}")]
    EvaluatorDefect { category: EventType, message: String },

    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TriageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short outcome label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TriageError::SourceUnavailable(_) => "source_unavailable",
            TriageError::PerceptionFailure(_) => "perception_failure",
            TriageError::EvaluatorDefect { .. } => "evaluator_defect",
            TriageError::Timeout(_) => "timeout",
            TriageError::ConfigError(_) => "config_error",
            TriageError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_embeds_cause() {
        let err = TriageError::SourceUnavailable(VisionError::source_unavailable("webcam 0"));
        assert_eq!(
            err.to_string(),
            "Source unavailable: Could not open video source: webcam 0"
        );
    }

    #[test]
    fn test_outcome_kinds() {
        let err = TriageError::EvaluatorDefect {
            category: EventType::Fall,
            message: "boom".to_string(),
        };
        assert_eq!(err.kind(), "evaluator_defect");
        assert_eq!(err.to_string(), "Evaluator defect in fall: boom");
        assert_eq!(TriageError::Timeout(Duration::from_secs(1)).kind(), "timeout");
    }
}
