//! YOLOv8 detector on ONNX Runtime.
//!
//! Runs an object model and, when configured, a YOLOv8-pose model on the
//! same preprocessed frame. Execution provider selection:
//! - CUDA on Linux with NVIDIA GPU (when `cuda` feature enabled)
//! - CoreML on macOS
//! - CPU fallback on all platforms

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use image::imageops::FilterType;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use super::postprocess::{decode_objects, decode_poses, FrameScale, OutputLayout};
use super::{DetectorBackend, RawDetection};
use crate::config::VisionConfig;
use crate::error::{VisionError, VisionResult};
use crate::frame::Frame;

/// Name of the output tensor exported by Ultralytics.
const OUTPUT_NAME: &str = "output0";

/// YOLOv8 object (and optional pose) detector.
///
/// Each ONNX session sits behind a mutex: inference on one session is
/// serialized, while separate detectors run independently.
pub struct YoloDetector {
    object_session: Mutex<Session>,
    pose_session: Option<Mutex<Session>>,
    config: VisionConfig,
}

impl YoloDetector {
    /// Load the configured models.
    ///
    /// Returns error if a model file doesn't exist or cannot be loaded.
    pub fn new(config: VisionConfig) -> VisionResult<Self> {
        let object_session = Mutex::new(create_session(Path::new(&config.model_path))?);
        let pose_session = match &config.pose_model_path {
            Some(path) => Some(Mutex::new(create_session(Path::new(path))?)),
            None => None,
        };

        info!(
            model_path = %config.model_path,
            pose_model_path = config.pose_model_path.as_deref().unwrap_or("-"),
            input_size = config.input_size,
            "YOLO detector initialized"
        );

        Ok(Self {
            object_session,
            pose_session,
            config,
        })
    }

    /// Preprocess a frame for YOLOv8 inference.
    ///
    /// - Resize to model input size
    /// - Normalize pixel values to [0, 1]
    /// - Convert to NCHW layout (batch, channels, height, width)
    fn preprocess(&self, frame: &Frame) -> Vec<f32> {
        let size = self.config.input_size;
        let resized = image::imageops::resize(frame.image(), size, size, FilterType::Triangle);
        let (w, h) = (size as usize, size as usize);

        let mut chw_data: Vec<f32> = vec![0.0; 3 * h * w];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let offset = y as usize * w + x as usize;
            for c in 0..3 {
                chw_data[c * h * w + offset] = pixel[c] as f32 / 255.0;
            }
        }
        chw_data
    }

    /// Run one session and return the flattened output with its layout.
    fn run_session(
        &self,
        session: &Mutex<Session>,
        input: Vec<f32>,
    ) -> VisionResult<(Vec<f32>, OutputLayout)> {
        let size = self.config.input_size as usize;
        let input: Value = Tensor::from_array((vec![1usize, 3, size, size], input.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| VisionError::inference_failed(format!("Failed to create tensor: {}", e)))?;

        let mut session = session
            .lock()
            .map_err(|_| VisionError::internal("Session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| VisionError::inference_failed(format!("ONNX inference failed: {}", e)))?;

        let output = outputs
            .get(OUTPUT_NAME)
            .ok_or_else(|| VisionError::invalid_output(format!("Missing {} tensor", OUTPUT_NAME)))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| VisionError::invalid_output(format!("Failed to extract tensor: {}", e)))?;

        let dims: Vec<i64> = shape.iter().copied().collect();
        let layout = OutputLayout::from_dims(&dims, data.len())?;
        Ok((data.to_vec(), layout))
    }
}

impl DetectorBackend for YoloDetector {
    fn name(&self) -> &str {
        "yolov8"
    }

    fn detect(&self, frame: &Frame) -> VisionResult<Vec<RawDetection>> {
        let started = Instant::now();
        let input = self.preprocess(frame);
        let scale = FrameScale::new(self.config.input_size, frame.width(), frame.height());

        let pose_input = self.pose_session.as_ref().map(|_| input.clone());

        let (output, layout) = self.run_session(&self.object_session, input)?;
        let mut detections = decode_objects(
            &output,
            layout,
            scale,
            self.config.confidence_threshold,
            self.config.nms_threshold,
        )?;

        if let (Some(session), Some(input)) = (&self.pose_session, pose_input) {
            let (output, layout) = self.run_session(session, input)?;
            detections.extend(decode_poses(
                &output,
                layout,
                scale,
                self.config.confidence_threshold,
                self.config.nms_threshold,
            )?);
        }

        debug!(
            count = detections.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "YOLO detection completed"
        );

        Ok(detections)
    }
}

/// Create ONNX Runtime session with automatic execution provider selection.
fn create_session(model_path: &Path) -> VisionResult<Session> {
    if !model_path.exists() {
        return Err(VisionError::model_not_found(model_path.display().to_string()));
    }

    let model_bytes = std::fs::read(model_path)?;

    let builder = Session::builder()
        .map_err(|e| {
            VisionError::DetectorUnavailable(format!("Failed to create session builder: {}", e))
        })?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| {
            VisionError::DetectorUnavailable(format!("Failed to set optimization level: {}", e))
        })?;

    #[cfg(all(target_os = "linux", feature = "cuda"))]
    {
        use ort::execution_providers::CUDAExecutionProvider;
        if let Ok(cuda_builder) = builder
            .clone()
            .with_execution_providers([CUDAExecutionProvider::default().build()])
        {
            if let Ok(session) = cuda_builder.commit_from_memory(&model_bytes) {
                info!("Using CUDA execution provider for detection");
                return Ok(session);
            }
        }
        debug!("CUDA execution provider not available, trying alternatives");
    }

    #[cfg(target_os = "macos")]
    {
        use ort::execution_providers::CoreMLExecutionProvider;
        if let Ok(coreml_builder) = builder
            .clone()
            .with_execution_providers([CoreMLExecutionProvider::default().build()])
        {
            if let Ok(session) = coreml_builder.commit_from_memory(&model_bytes) {
                info!("Using CoreML execution provider for detection");
                return Ok(session);
            }
        }
        debug!("CoreML execution provider not available, using CPU");
    }

    info!(model = %model_path.display(), "Using CPU execution provider for detection");
    builder
        .commit_from_memory(&model_bytes)
        .map_err(|e| VisionError::DetectorUnavailable(format!("Failed to load ONNX model: {}", e)))
}
