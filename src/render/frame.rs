use std::path::Path;

use image::{
    codecs::png::PngEncoder, imageops::FilterType, ColorType, ImageBuffer, ImageEncoder, Rgb,
    RgbImage,
};

use crate::{
    art::color::Color,
    error::{RenderError, Result},
};

/// A rendered image
///
/// Thin wrapper around an RGB buffer with the pixel access the renderer and the video
/// pipeline need.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a frame of the given dimensions filled with `color`
    pub fn new_filled(width: u32, height: u32, color: Color) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb(color));
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        self.buffer.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Raw RGB bytes, row major
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// High quality square resize, used to bring frames to encoder-friendly dimensions
    pub fn resize_to(&self, size: u32) -> Self {
        if self.width() == size && self.height() == size {
            return self.clone();
        }
        let buffer = image::imageops::resize(&self.buffer, size, size, FilterType::Lanczos3);
        Self { buffer }
    }

    /// Encode as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(self.buffer.as_raw(), self.width(), self.height(), ColorType::Rgb8)
            .map_err(|e| RenderError::EncodeFailed {
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_filled_frame() {
        let frame = Frame::new_filled(4, 3, [9, 8, 7]);
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.get_pixel(3, 2), [9, 8, 7]);
        assert_eq!(frame.as_rgb_bytes().len(), 4 * 3 * 3);
    }

    #[test]
    fn test_resize_solid_color() {
        let frame = Frame::new_filled(50, 50, [20, 120, 220]).resize_to(64);
        assert_eq!((frame.width(), frame.height()), (64, 64));
        assert_eq!(frame.get_pixel(32, 32), [20, 120, 220]);
    }

    #[test]
    fn test_png_encoding() {
        let frame = Frame::new_filled(8, 8, [1, 2, 3]);
        let png = frame.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.png");
        frame.save_png(&path).unwrap();
        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(4, 4).0, [1, 2, 3]);
    }
}
