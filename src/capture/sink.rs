//! Still capture from the active session.

use thiserror::Error;

use super::raster::{Raster, Transform};
use super::CapturedFrame;
use crate::config::CameraConfig;
use crate::platform::MediaPlatform;
use crate::session::{CameraError, CameraSession};

/// Errors that can occur while capturing a still.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error("failed to encode still image: {0}")]
    Encode(#[from] image::ImageError),
}

impl CaptureError {
    /// Message shown to the user when this error is surfaced.
    pub fn user_message(&self) -> String {
        match self {
            CaptureError::Camera(e) => e.user_message(),
            CaptureError::Encode(e) => format!("Could not save the photo: {}", e),
        }
    }
}

/// What the photo area currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    /// The live camera preview.
    LivePreview,
    /// The captured still.
    Still,
}

/// Turns the live preview into still images.
#[derive(Debug)]
pub struct CaptureSink {
    quality: u8,
    current: Option<CapturedFrame>,
    sequence: u64,
}

impl CaptureSink {
    /// Creates a sink encoding at the given JPEG quality.
    pub fn new(quality: u8) -> Self {
        Self {
            quality,
            current: None,
            sequence: 0,
        }
    }

    /// Creates a sink from the camera configuration.
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.jpeg_quality)
    }

    /// Captures the frame currently in the preview.
    ///
    /// The raster matches the frame's native size. Front-facing frames are
    /// flipped so the still looks like the mirrored preview the user saw.
    /// Fails with [`CameraError::NoActiveSession`] unless the session is
    /// active, leaving any previous still untouched.
    pub fn capture<P: MediaPlatform>(
        &mut self,
        session: &CameraSession<P>,
    ) -> Result<&CapturedFrame, CaptureError> {
        let (source, facing) = session.read_frame()?;

        let mut raster = Raster::new(source.width(), source.height());
        let transform = if facing.is_mirrored() {
            Transform::MirrorX
        } else {
            Transform::Identity
        };
        raster.draw(&source, transform);
        let jpeg = raster.encode_jpeg(self.quality)?;

        self.sequence += 1;
        let frame = CapturedFrame::new(jpeg, raster.width(), raster.height(), facing, self.sequence);

        tracing::info!(
            sequence = frame.sequence(),
            facing = %facing,
            mirrored = frame.is_mirrored(),
            bytes = frame.bytes().len(),
            "Captured still"
        );

        Ok(&*self.current.insert(frame))
    }

    /// Discards the current still and returns to the live preview.
    pub fn retake(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("Discarded captured still");
        }
    }

    /// What the photo area shows.
    pub fn mode(&self) -> SinkMode {
        if self.current.is_some() {
            SinkMode::Still
        } else {
            SinkMode::LivePreview
        }
    }

    /// The current still, if one has been taken.
    pub fn current(&self) -> Option<&CapturedFrame> {
        self.current.as_ref()
    }

    /// Number of stills captured so far.
    pub fn captures(&self) -> u64 {
        self.sequence
    }
}
