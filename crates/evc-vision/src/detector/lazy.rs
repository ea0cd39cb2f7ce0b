//! Initialize-once detector handle.
//!
//! Loading ONNX models is expensive, so a process owns one [`LazyDetector`]
//! and shares it (behind an `Arc`) with every pipeline. The wrapped backend
//! is built at most once, either eagerly through [`LazyDetector::initialize`]
//! at startup or on the first frame. A failed initialization is remembered
//! and reported on every later call instead of being retried.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{error, info};

use super::yolo::YoloDetector;
use super::{DetectorBackend, RawDetection};
use crate::config::VisionConfig;
use crate::error::{VisionError, VisionResult};
use crate::frame::Frame;

type Init = Box<dyn Fn() -> VisionResult<Arc<dyn DetectorBackend>> + Send + Sync>;

/// Detector built on first use and reused for the lifetime of the handle.
pub struct LazyDetector {
    init: Init,
    backend: OnceLock<Result<Arc<dyn DetectorBackend>, String>>,
}

impl LazyDetector {
    /// Wrap an arbitrary backend constructor.
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> VisionResult<Arc<dyn DetectorBackend>> + Send + Sync + 'static,
    {
        Self {
            init: Box::new(init),
            backend: OnceLock::new(),
        }
    }

    /// Lazily load the YOLOv8 models named by `config`.
    pub fn yolo(config: VisionConfig) -> Self {
        Self::new(move || {
            let detector = YoloDetector::new(config.clone())?;
            Ok(Arc::new(detector) as Arc<dyn DetectorBackend>)
        })
    }

    /// Build the backend now. Later calls return the cached outcome.
    pub fn initialize(&self) -> VisionResult<()> {
        self.backend().map(|_| ())
    }

    /// True once initialization has been attempted.
    pub fn is_initialized(&self) -> bool {
        self.backend.get().is_some()
    }

    fn backend(&self) -> VisionResult<&Arc<dyn DetectorBackend>> {
        let outcome = self.backend.get_or_init(|| match (self.init)() {
            Ok(backend) => {
                info!(backend = backend.name(), "Detector ready");
                Ok(backend)
            }
            Err(e) => {
                error!(error = %e, "Detector initialization failed");
                Err(e.to_string())
            }
        });

        outcome
            .as_ref()
            .map_err(|message| VisionError::DetectorUnavailable(message.clone()))
    }
}

impl DetectorBackend for LazyDetector {
    fn name(&self) -> &str {
        match self.backend.get() {
            Some(Ok(backend)) => backend.name(),
            _ => "lazy",
        }
    }

    fn detect(&self, frame: &Frame) -> VisionResult<Vec<RawDetection>> {
        self.backend()?.detect(frame)
    }
}

impl fmt::Debug for LazyDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyDetector")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
