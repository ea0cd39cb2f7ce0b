//! Frame acquisition from webcams, files and uploaded bytes.
//!
//! Still images are decoded with the `image` crate. Video files, webcams and
//! uploaded video bytes go through OpenCV `VideoCapture` when the `opencv`
//! feature is enabled; without it those sources report
//! [`VisionError::SourceUnavailable`].

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{VisionError, VisionResult};
use crate::frame::Frame;

/// Extensions decoded as still images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Extensions decoded as video streams.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// Where a frame should come from.
#[derive(Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// The default capture device
    Webcam,
    /// A named image or video file
    File(PathBuf),
    /// Raw uploaded bytes (image or video container)
    Bytes(Vec<u8>),
}

impl SourceDescriptor {
    /// Parse a textual descriptor: `webcam` or a file path with a supported extension.
    pub fn parse(source: &str) -> VisionResult<Self> {
        let source = source.trim();
        if source.eq_ignore_ascii_case("webcam") {
            return Ok(Self::Webcam);
        }

        let path = PathBuf::from(source);
        if media_kind(&path).is_none() {
            return Err(VisionError::UnsupportedSource(source.to_string()));
        }
        Ok(Self::File(path))
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceDescriptor::Webcam => "webcam",
            SourceDescriptor::File(_) => "file",
            SourceDescriptor::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Debug for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::Webcam => f.write_str("Webcam"),
            SourceDescriptor::File(path) => f.debug_tuple("File").field(path).finish(),
            SourceDescriptor::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaKind {
    Image,
    Video,
}

fn media_kind(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Produces exactly one frame from a source descriptor.
pub trait FrameGrabber: Send + Sync {
    fn grab(&self, source: &SourceDescriptor) -> VisionResult<Frame>;
}

/// Frame grabber backed by `image` decoding and OpenCV capture.
#[derive(Debug, Clone)]
pub struct MediaFrameGrabber {
    webcam_index: i32,
}

impl MediaFrameGrabber {
    /// Create a grabber reading the given webcam device for `webcam` sources.
    pub fn new(webcam_index: i32) -> Self {
        Self { webcam_index }
    }

    fn grab_file(&self, path: &Path) -> VisionResult<Frame> {
        if !path.exists() {
            return Err(VisionError::FileNotFound(path.to_path_buf()));
        }

        match media_kind(path) {
            Some(MediaKind::Image) => Frame::from_image(image::open(path)?),
            Some(MediaKind::Video) => capture::first_frame_from_file(path),
            None => Err(VisionError::UnsupportedSource(path.display().to_string())),
        }
    }

    fn grab_bytes(&self, bytes: &[u8]) -> VisionResult<Frame> {
        if bytes.is_empty() {
            return Err(VisionError::frame_unreadable("Uploaded content is empty"));
        }

        match image::load_from_memory(bytes) {
            Ok(image) => Frame::from_image(image),
            Err(e) => {
                debug!(error = %e, "Upload is not a still image, trying video decode");
                capture::first_frame_from_bytes(bytes)
            }
        }
    }
}

impl Default for MediaFrameGrabber {
    fn default() -> Self {
        Self::new(0)
    }
}

impl FrameGrabber for MediaFrameGrabber {
    fn grab(&self, source: &SourceDescriptor) -> VisionResult<Frame> {
        let frame = match source {
            SourceDescriptor::Webcam => capture::first_frame_from_webcam(self.webcam_index),
            SourceDescriptor::File(path) => self.grab_file(path),
            SourceDescriptor::Bytes(bytes) => self.grab_bytes(bytes),
        }?;

        debug!(
            source = source.kind(),
            width = frame.width(),
            height = frame.height(),
            "Frame acquired"
        );
        Ok(frame)
    }
}

#[cfg(feature = "opencv")]
mod capture {
    use std::io::Write;
    use std::path::Path;

    use opencv::core::Mat;
    use opencv::prelude::*;
    use opencv::videoio::{VideoCapture, CAP_ANY};

    use crate::error::{VisionError, VisionResult};
    use crate::frame::Frame;

    pub fn first_frame_from_webcam(index: i32) -> VisionResult<Frame> {
        let cap = VideoCapture::new(index, CAP_ANY)
            .map_err(|e| VisionError::source_unavailable(format!("webcam {}: {}", index, e)))?;
        read_first(cap, &format!("webcam {}", index))
    }

    pub fn first_frame_from_file(path: &Path) -> VisionResult<Frame> {
        let name = path.display().to_string();
        let cap = VideoCapture::from_file(path.to_str().unwrap_or(""), CAP_ANY)
            .map_err(|e| VisionError::source_unavailable(format!("{}: {}", name, e)))?;
        read_first(cap, &name)
    }

    /// Uploaded video bytes are decoded from a scoped temporary file that is
    /// removed when this function returns, on success and failure alike.
    pub fn first_frame_from_bytes(bytes: &[u8]) -> VisionResult<Frame> {
        let mut temp = tempfile::Builder::new()
            .prefix("evc-upload-")
            .suffix(".mp4")
            .tempfile()?;
        temp.write_all(bytes)?;
        temp.flush()?;

        first_frame_from_file(temp.path())
    }

    fn read_first(mut cap: VideoCapture, name: &str) -> VisionResult<Frame> {
        if !cap.is_opened().unwrap_or(false) {
            return Err(VisionError::source_unavailable(name.to_string()));
        }

        let mut frame = Mat::default();
        let ok = cap.read(&mut frame).unwrap_or(false);
        // Release the device before decoding so webcams are freed promptly.
        let _ = cap.release();
        if !ok || frame.empty() {
            return Err(VisionError::frame_unreadable(name.to_string()));
        }

        let mut rgb = Mat::default();
        opencv::imgproc::cvt_color_def(&frame, &mut rgb, opencv::imgproc::COLOR_BGR2RGB)
            .map_err(|e| VisionError::frame_unreadable(format!("Color conversion failed: {}", e)))?;

        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let data = rgb
            .data_bytes()
            .map_err(|e| {
                VisionError::frame_unreadable(format!("Failed to get frame data: {}", e))
            })?;

        Frame::from_rgb(width, height, data.to_vec())
    }
}

#[cfg(not(feature = "opencv"))]
mod capture {
    use std::path::Path;

    use crate::error::{VisionError, VisionResult};
    use crate::frame::Frame;

    const NO_OPENCV: &str = "video capture requires the `opencv` feature";

    pub fn first_frame_from_webcam(index: i32) -> VisionResult<Frame> {
        Err(VisionError::source_unavailable(format!("webcam {} ({})", index, NO_OPENCV)))
    }

    pub fn first_frame_from_file(path: &Path) -> VisionResult<Frame> {
        Err(VisionError::source_unavailable(format!("{} ({})", path.display(), NO_OPENCV)))
    }

    pub fn first_frame_from_bytes(_bytes: &[u8]) -> VisionResult<Frame> {
        Err(VisionError::source_unavailable(format!("uploaded video ({})", NO_OPENCV)))
    }
}
