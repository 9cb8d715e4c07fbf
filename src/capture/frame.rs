//! Captured still image with metadata.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};

use crate::session::Facing;

/// MIME type of every captured still.
pub const JPEG_MIME: &str = "image/jpeg";

/// A still image taken from the live preview.
///
/// Immutable once produced; a retake discards it.
#[derive(Clone)]
pub struct CapturedFrame {
    /// Encoded JPEG bytes.
    jpeg: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Facing of the camera at capture time.
    facing: Facing,
    /// Whether the horizontal flip was applied.
    mirrored: bool,
    /// Wall-clock capture time.
    captured_at: DateTime<Utc>,
    /// Monotonic capture number within a sink.
    sequence: u64,
}

impl CapturedFrame {
    /// Creates a frame stamped with the current time.
    pub fn new(jpeg: Vec<u8>, width: u32, height: u32, facing: Facing, sequence: u64) -> Self {
        Self {
            jpeg,
            width,
            height,
            facing,
            mirrored: facing.is_mirrored(),
            captured_at: Utc::now(),
            sequence,
        }
    }

    /// Returns the encoded image.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.jpeg
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the facing at capture time.
    #[inline]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Returns true if the image was mirrored.
    #[inline]
    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Encodes the image as a `data:` URL for a form field.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", JPEG_MIME, STANDARD.encode(&self.jpeg))
    }
}

impl std::fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("facing", &self.facing)
            .field("mirrored", &self.mirrored)
            .field("sequence", &self.sequence)
            .field("jpeg_bytes", &self.jpeg.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = CapturedFrame::new(vec![0xFF, 0xD8, 0xFF], 640, 480, Facing::Front, 1);

        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_mirrored());
        assert_eq!(frame.to_data_url(), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_back_frame_not_mirrored() {
        let frame = CapturedFrame::new(Vec::new(), 4, 4, Facing::Back, 1);
        assert!(!frame.is_mirrored());
    }
}
