//! Orchestrator - runs one analysis from frame acquisition to final judgment.
//!
//! ```text
//! ACQUIRE_FRAME -> DETECT -> ROUTE -> ARBITRATE -> DONE
//!       |            |
//!       +------------+--> FAILED (fallback judgment)
//! ```
//!
//! `analyze` never fails: pipeline failures are logged and turned into the
//! severity 0.0 fallback judgment. Evaluator panics are isolated to the
//! detection that triggered them.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use evc_models::{Detection, Judgment};
use evc_vision::{
    DetectionAdapter, DetectorBackend, FrameGrabber, LabelSet, MediaFrameGrabber, SourceDescriptor,
    VisionConfig,
};
use tracing::{debug, error, warn};

use crate::arbitrator::arbitrate;
use crate::config::TriageConfig;
use crate::error::{TriageError, TriageResult};
use crate::evaluators::Evaluator;
use crate::logging::AnalysisLogger;
use crate::registry::EvaluatorRegistry;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    AcquireFrame,
    Detect,
    Route,
    Arbitrate,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::AcquireFrame => "acquire_frame",
            PipelineStage::Detect => "detect",
            PipelineStage::Route => "route",
            PipelineStage::Arbitrate => "arbitrate",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }

    /// Stage at which an aborting error occurs.
    pub fn of_error(error: &TriageError) -> Self {
        match error {
            TriageError::SourceUnavailable(_) => PipelineStage::AcquireFrame,
            TriageError::PerceptionFailure(_) => PipelineStage::Detect,
            TriageError::EvaluatorDefect { .. } => PipelineStage::Route,
            _ => PipelineStage::Failed,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-frame analysis pipeline.
///
/// Holds no per-call state, so one instance can serve concurrent callers.
pub struct Orchestrator {
    grabber: Arc<dyn FrameGrabber>,
    adapter: DetectionAdapter,
    registry: EvaluatorRegistry,
}

impl Orchestrator {
    pub fn new(
        grabber: Arc<dyn FrameGrabber>,
        adapter: DetectionAdapter,
        registry: EvaluatorRegistry,
    ) -> Self {
        Self {
            grabber,
            adapter,
            registry,
        }
    }

    /// Wire the media grabber and evaluators around a shared detector.
    pub fn from_config(
        vision: &VisionConfig,
        triage: &TriageConfig,
        detector: Arc<dyn DetectorBackend>,
    ) -> TriageResult<Self> {
        let labels = match &vision.labels_path {
            Some(path) => LabelSet::from_file(path).map_err(|e| {
                TriageError::config_error(format!("Failed to load labels from {}: {}", path, e))
            })?,
            None => LabelSet::coco(),
        };

        Ok(Self::new(
            Arc::new(MediaFrameGrabber::new(vision.webcam_index)),
            DetectionAdapter::new(detector, labels),
            EvaluatorRegistry::new(triage),
        ))
    }

    /// Analyze one frame from `source`. Always returns a judgment.
    pub fn analyze(&self, source: &SourceDescriptor, mock: bool) -> Judgment {
        let logger = AnalysisLogger::new(source.kind(), mock);
        let span = logger.create_span();
        let _enter = span.enter();

        logger.log_start();
        let result = self.run(source, mock);
        self.finish(&logger, result)
    }

    /// Parse a textual source descriptor and analyze it.
    ///
    /// Unsupported descriptors fail like an unavailable source.
    pub fn analyze_source(&self, source: &str, mock: bool) -> Judgment {
        match SourceDescriptor::parse(source) {
            Ok(descriptor) => self.analyze(&descriptor, mock),
            Err(e) => {
                let logger = AnalysisLogger::new("unsupported", mock);
                let span = logger.create_span();
                let _enter = span.enter();
                self.finish(&logger, Err(TriageError::SourceUnavailable(e)))
            }
        }
    }

    /// Run the pipeline, surfacing aborting errors.
    pub fn run(&self, source: &SourceDescriptor, mock: bool) -> TriageResult<Judgment> {
        debug!(stage = %PipelineStage::AcquireFrame, "Stage transition");
        let frame = self
            .grabber
            .grab(source)
            .map_err(TriageError::SourceUnavailable)?;

        debug!(
            stage = %PipelineStage::Detect,
            width = frame.width(),
            height = frame.height(),
            "Stage transition"
        );
        let detections = self
            .adapter
            .detect(&frame)
            .map_err(TriageError::PerceptionFailure)?;

        debug!(stage = %PipelineStage::Route, detections = detections.len(), "Stage transition");
        let judgments = self.route(&detections, mock);

        debug!(stage = %PipelineStage::Arbitrate, judgments = judgments.len(), "Stage transition");
        let judgment = arbitrate(judgments);

        debug!(stage = %PipelineStage::Done, severity = judgment.severity, "Stage transition");
        Ok(judgment)
    }

    /// Evaluate each detection alone against its category evaluator.
    pub fn route(&self, detections: &[Detection], mock: bool) -> Vec<Judgment> {
        route_with(detections, mock, |label| {
            self.registry
                .lookup(label)
                .map(|evaluator| evaluator as &dyn Evaluator)
        })
    }

    fn finish(&self, logger: &AnalysisLogger, result: TriageResult<Judgment>) -> Judgment {
        match result {
            Ok(judgment) => {
                metrics::counter!("evc_analyses_total", "outcome" => "ok").increment(1);
                logger.log_completion(judgment.severity, judgment.categories.len());
                judgment
            }
            Err(e) => {
                metrics::counter!("evc_analyses_total", "outcome" => e.kind()).increment(1);
                logger.log_failure(PipelineStage::of_error(&e).as_str(), &e.to_string());
                Judgment::failure(&e)
            }
        }
    }
}

/// Evaluate each detection alone against the evaluator `lookup` returns.
///
/// Unrouted labels are skipped. A defective evaluator loses only the
/// judgment for the detection it panicked on.
pub fn route_with<'a, F>(detections: &[Detection], mock: bool, lookup: F) -> Vec<Judgment>
where
    F: Fn(&str) -> Option<&'a dyn Evaluator>,
{
    let mut judgments = Vec::new();
    for detection in detections {
        let Some(evaluator) = lookup(detection.label()) else {
            debug!(label = detection.label(), "No evaluator for label");
            continue;
        };

        match evaluate_isolated(evaluator, detection, mock) {
            Ok(judgment) => judgments.push(judgment),
            Err(e) => warn!(error = %e, "Dropping judgment from defective evaluator"),
        }
    }
    judgments
}

/// Run one evaluator on a single detection, converting a panic into
/// [`TriageError::EvaluatorDefect`].
pub fn evaluate_isolated(
    evaluator: &dyn Evaluator,
    detection: &Detection,
    mock: bool,
) -> TriageResult<Judgment> {
    let category = evaluator.category();
    catch_unwind(AssertUnwindSafe(|| {
        evaluator.evaluate(std::slice::from_ref(detection), mock)
    }))
    .map_err(|payload| {
        metrics::counter!("evc_evaluator_defects_total", "category" => category.as_str())
            .increment(1);
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        TriageError::EvaluatorDefect { category, message }
    })
}

/// Analyze on the blocking pool, falling back to the failure judgment when
/// `limit` elapses first.
///
/// The blocking task is not cancelled on timeout; it finishes in the
/// background and its result is discarded.
pub async fn analyze_with_timeout(
    orchestrator: Arc<Orchestrator>,
    source: SourceDescriptor,
    mock: bool,
    limit: Duration,
) -> Judgment {
    let task = tokio::task::spawn_blocking(move || orchestrator.analyze(&source, mock));

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(judgment)) => judgment,
        Ok(Err(join_error)) => {
            let e = TriageError::internal(format!("analysis task failed: {}", join_error));
            error!(error = %e, "Analysis task did not complete");
            metrics::counter!("evc_analyses_total", "outcome" => e.kind()).increment(1);
            Judgment::failure(&e)
        }
        Err(_) => {
            let e = TriageError::Timeout(limit);
            warn!(error = %e, "Analysis exceeded its time limit");
            metrics::counter!("evc_analyses_total", "outcome" => e.kind()).increment(1);
            Judgment::failure(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evc_models::{BoundingBox, EventType, FAILURE_SEVERITY};
    use evc_vision::{Frame, RawDetection, VisionError, VisionResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::evaluators::fire;

    #[derive(Default)]
    struct Panicking {
        calls: AtomicUsize,
    }

    impl Evaluator for Panicking {
        fn category(&self) -> EventType {
            EventType::Smoke
        }

        fn evaluate(&self, _detections: &[Detection], _mock: bool) -> Judgment {
            self.calls.fetch_add(1, Ordering::SeqCst);
            panic!("boom")
        }
    }

    struct OneFrame;

    impl FrameGrabber for OneFrame {
        fn grab(&self, source: &SourceDescriptor) -> VisionResult<Frame> {
            match source {
                SourceDescriptor::Webcam => Frame::from_rgb(4, 4, vec![0; 48]),
                _ => Err(VisionError::source_unavailable("no such device")),
            }
        }
    }

    struct Silent;

    impl DetectorBackend for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        fn detect(&self, _frame: &Frame) -> VisionResult<Vec<RawDetection>> {
            Ok(Vec::new())
        }
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(
            Arc::new(OneFrame),
            DetectionAdapter::new(Arc::new(Silent), LabelSet::coco()),
            EvaluatorRegistry::default(),
        )
    }

    #[test]
    fn test_evaluator_panic_becomes_defect() {
        let detection = Detection::object("smoke", 0.9, BoundingBox::new(0, 0, 10, 10));
        match evaluate_isolated(&Panicking::default(), &detection, false) {
            Err(TriageError::EvaluatorDefect { category, message }) => {
                assert_eq!(category, EventType::Smoke);
                assert_eq!(message, "boom");
            }
            other => panic!("expected defect, got {:?}", other),
        }
    }

    #[test]
    fn test_defective_evaluator_does_not_block_others() {
        let panicking = Panicking::default();
        let fire = fire::evaluator(0.5);
        let detections = vec![
            Detection::object("smoke", 0.9, BoundingBox::new(0, 0, 10, 10)),
            Detection::object("fire", 0.9, BoundingBox::new(10, 10, 50, 50)),
            Detection::object("smoke", 0.8, BoundingBox::new(5, 5, 10, 10)),
        ];

        let judgments = route_with(&detections, false, |label| match label {
            "smoke" => Some(&panicking as &dyn Evaluator),
            "fire" => Some(&fire as &dyn Evaluator),
            _ => None,
        });

        assert_eq!(panicking.calls.load(Ordering::SeqCst), 2);
        assert_eq!(judgments.len(), 1);
        assert_eq!(judgments[0].severity, 0.85);
        assert_eq!(arbitrate(judgments).categories, vec![EventType::Fire]);
    }

    #[test]
    fn test_route_skips_unknown_labels() {
        let detections = vec![
            Detection::object("car", 0.99, BoundingBox::new(0, 0, 10, 10)),
            Detection::pose(0.9, Vec::new()),
            Detection::object("fire", 0.9, BoundingBox::new(10, 10, 50, 50)),
        ];
        let judgments = orchestrator().route(&detections, false);
        assert_eq!(judgments.len(), 1);
        assert_eq!(judgments[0].severity, 0.85);
    }

    #[test]
    fn test_route_evaluates_each_detection_alone() {
        let detections = vec![
            Detection::object("person", 0.6, BoundingBox::new(0, 0, 150, 80)),
            Detection::object("person", 0.9, BoundingBox::new(0, 0, 50, 170)),
        ];
        let judgments = orchestrator().route(&detections, false);
        assert_eq!(judgments.len(), 2);
        assert_eq!(judgments[0].severity, 0.8);
        assert!(judgments[1].is_neutral());
    }

    #[test]
    fn test_unsupported_source_is_failure() {
        let judgment = orchestrator().analyze_source("notes.txt", false);
        assert_eq!(judgment.severity, FAILURE_SEVERITY);
        assert!(judgment.explanation.contains("Unsupported video source type: notes.txt"));
        assert_eq!(judgment.recommended_actions.len(), 1);
        assert!(judgment.events.is_empty());
    }

    #[test]
    fn test_run_surfaces_source_error() {
        let err = orchestrator()
            .run(&SourceDescriptor::Bytes(vec![1, 2, 3]), false)
            .unwrap_err();
        assert!(matches!(err, TriageError::SourceUnavailable(_)));
        assert_eq!(PipelineStage::of_error(&err), PipelineStage::AcquireFrame);
    }

    #[test]
    fn test_empty_frame_is_no_event() {
        let judgment = orchestrator().analyze(&SourceDescriptor::Webcam, false);
        assert_eq!(judgment.severity, 0.05);
        assert_eq!(judgment.recommended_actions, vec!["Continue monitoring."]);
    }
}
