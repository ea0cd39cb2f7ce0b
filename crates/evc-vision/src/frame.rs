//! Decoded video frame.

use image::{DynamicImage, ImageBuffer, RgbImage};

use crate::error::{VisionError, VisionResult};

/// A single decoded RGB frame.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap raw RGB bytes (`width * height * 3`).
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> VisionResult<Self> {
        let expected_len = width as usize * height as usize * 3;
        if data.len() != expected_len {
            return Err(VisionError::frame_unreadable(format!(
                "Invalid frame data length: expected {}, got {}",
                expected_len,
                data.len()
            )));
        }

        let image: RgbImage = ImageBuffer::from_raw(width, height, data)
            .ok_or_else(|| VisionError::internal("Failed to create image buffer"))?;
        Self::from_rgb_image(image)
    }

    /// Wrap an already decoded image.
    pub fn from_image(image: DynamicImage) -> VisionResult<Self> {
        Self::from_rgb_image(image.to_rgb8())
    }

    fn from_rgb_image(image: RgbImage) -> VisionResult<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(VisionError::frame_unreadable("Frame has no pixels"));
        }
        Ok(Self { image })
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the pixel buffer.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb_checks_length() {
        assert!(Frame::from_rgb(2, 2, vec![0; 12]).is_ok());
        assert!(Frame::from_rgb(2, 2, vec![0; 11]).is_err());
    }

    #[test]
    fn test_empty_frame_rejected() {
        assert!(Frame::from_rgb(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn test_dimensions() {
        let frame = Frame::from_rgb(4, 3, vec![255; 36]).unwrap();
        assert_eq!((frame.width(), frame.height()), (4, 3));
    }
}
