//! Pixel frames handed to OCR engines

use image::imageops::FilterType;
use image::RgbaImage;
use tracing::debug;

use super::RecognitionError;
use crate::picker::Bitmap;

/// An RGBA8 frame ready for an engine
#[derive(Debug, Clone)]
pub struct RgbaFrame {
    image: RgbaImage,
}

impl RgbaFrame {
    /// Wrap an RGBA buffer; empty buffers are rejected
    pub fn new(image: RgbaImage) -> Result<Self, RecognitionError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RecognitionError::ImageDecode);
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Raw RGBA pixel data, row-major
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Scale down so neither side exceeds `max_dimension`, keeping aspect ratio
    pub fn fit_within(self, max_dimension: u32) -> Result<Self, RecognitionError> {
        let (width, height) = self.dimensions();
        let Some((new_width, new_height)) = scaled_size(width, height, max_dimension) else {
            return Ok(self);
        };

        if new_width == 0 || new_height == 0 {
            return Err(RecognitionError::ImageDecode);
        }

        debug!(
            "Downscaling {}x{} frame to {}x{}",
            width, height, new_width, new_height
        );

        let resized =
            image::imageops::resize(&self.image, new_width, new_height, FilterType::Triangle);
        Self::new(resized)
    }
}

/// Target size when the longest side exceeds the limit; `None` when it fits
fn scaled_size(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if max_dimension == 0 || longest <= max_dimension {
        return None;
    }

    // Longest side lands exactly on the limit; a 0 short side means it collapsed
    let shorter = width.min(height) as f64 * max_dimension as f64 / longest as f64;
    let shorter = shorter.round() as u32;
    if width >= height {
        Some((max_dimension, shorter))
    } else {
        Some((shorter, max_dimension))
    }
}

/// Convert a picked bitmap into the RGBA frame engines consume
pub fn prepare_frame(bitmap: &Bitmap, max_dimension: u32) -> Result<RgbaFrame, RecognitionError> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(RecognitionError::ImageDecode);
    }

    // Shrink before converting so large photos aren't copied at full size
    let image = match scaled_size(width, height, max_dimension) {
        Some((new_width, new_height)) if new_width > 0 && new_height > 0 => {
            debug!(
                "Downscaling {} from {}x{} to {}x{}",
                bitmap.name(),
                width,
                height,
                new_width,
                new_height
            );
            bitmap
                .image()
                .resize_exact(new_width, new_height, FilterType::Triangle)
                .to_rgba8()
        }
        Some(_) => return Err(RecognitionError::ImageDecode),
        None => bitmap.image().to_rgba8(),
    };

    RgbaFrame::new(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn bitmap(width: u32, height: u32) -> Bitmap {
        Bitmap::new("frame.png", DynamicImage::new_rgb8(width, height))
    }

    #[test]
    fn test_prepare_frame_converts_to_rgba() {
        let frame = prepare_frame(&bitmap(20, 10), 4096).unwrap();
        assert_eq!(frame.dimensions(), (20, 10));
        assert_eq!(frame.as_raw().len(), 20 * 10 * 4);
    }

    #[test]
    fn test_prepare_frame_rejects_empty_bitmap() {
        assert_eq!(
            prepare_frame(&bitmap(0, 0), 4096).unwrap_err(),
            RecognitionError::ImageDecode
        );
        assert_eq!(
            prepare_frame(&bitmap(12, 0), 4096).unwrap_err(),
            RecognitionError::ImageDecode
        );
    }

    #[test]
    fn test_prepare_frame_downscales_large_bitmap() {
        let frame = prepare_frame(&bitmap(1000, 500), 200).unwrap();
        assert_eq!(frame.dimensions(), (200, 100));
    }

    #[test]
    fn test_prepare_frame_rejects_collapsed_side() {
        // 10000x1 scaled to 100 wide would be 0 pixels tall
        assert_eq!(
            prepare_frame(&bitmap(10000, 1), 100).unwrap_err(),
            RecognitionError::ImageDecode
        );
    }

    #[test]
    fn test_downscale_hits_limit_exactly() {
        let frame = prepare_frame(&bitmap(3001, 1500), 1000).unwrap();
        assert_eq!(frame.dimensions(), (1000, 500));

        let frame = prepare_frame(&bitmap(1200, 3001), 1000).unwrap();
        assert_eq!(frame.dimensions(), (400, 1000));
    }

    #[test]
    fn test_zero_limit_means_unbounded() {
        let frame = prepare_frame(&bitmap(300, 40), 0).unwrap();
        assert_eq!(frame.dimensions(), (300, 40));
    }

    #[test]
    fn test_fit_within_keeps_small_frames() {
        let frame = RgbaFrame::new(RgbaImage::new(50, 80)).unwrap();
        let frame = frame.fit_within(100).unwrap();
        assert_eq!(frame.dimensions(), (50, 80));

        let frame = frame.fit_within(40).unwrap();
        assert_eq!(frame.dimensions(), (25, 40));
    }
}
