//! Off-screen raster the live frame is drawn into before encoding.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbImage};

/// Geometric transform applied while drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Draw as-is.
    Identity,
    /// `translate(width, 0)` then `scale(-1, 1)`: a horizontal flip.
    MirrorX,
}

/// An RGB drawing surface.
pub struct Raster {
    buffer: RgbImage,
}

impl Raster {
    /// Creates a cleared raster of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: RgbImage::new(width, height),
        }
    }

    /// Raster width in pixels.
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Raster height in pixels.
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Draws `source` stretched over the whole raster under `transform`.
    pub fn draw(&mut self, source: &RgbImage, transform: Transform) {
        let fitted;
        let source = if source.dimensions() == self.buffer.dimensions() {
            source
        } else {
            fitted = imageops::resize(source, self.width(), self.height(), FilterType::Triangle);
            &fitted
        };

        match transform {
            Transform::Identity => imageops::replace(&mut self.buffer, source, 0, 0),
            Transform::MirrorX => {
                let flipped = imageops::flip_horizontal(source);
                imageops::replace(&mut self.buffer, &flipped, 0, 0);
            }
        }
    }

    /// Encodes the raster as JPEG.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, image::ImageError> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        encoder.write_image(
            self.buffer.as_raw(),
            self.width(),
            self.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(buffer)
    }

    /// Returns the drawn pixels.
    pub fn pixels(&self) -> &RgbImage {
        &self.buffer
    }
}
