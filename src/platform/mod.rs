//! Device-media platform abstraction.
//!
//! Everything the camera layer needs from the host is expressed here:
//! enumerating devices, opening a stream under constraints, and the
//! stream handle itself. The session and catalog never talk to hardware
//! directly, which is what lets the mock drive every test.

mod mock;
#[cfg(feature = "camera")]
mod native;

pub use mock::{MockDevice, MockPlatform, MockStream, LEFT_COLOR, RIGHT_COLOR};
#[cfg(feature = "camera")]
pub use native::{NativePlatform, NativeStream};

use image::RgbImage;
use thiserror::Error;

use crate::session::Facing;

/// Errors reported by a media platform.
///
/// These mirror the failure names of browser media APIs and are mapped
/// into [`CameraError`](crate::session::CameraError) at the session
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("permission to use the camera was denied")]
    NotAllowed,
    #[error("no camera matched the requested constraints")]
    NotFound,
    #[error("camera could not be read: {0}")]
    NotReadable(String),
    #[error("camera access is not supported on this platform")]
    Unsupported,
}

/// Kind of a media device reported by enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// A camera.
    VideoInput,
    /// A microphone.
    AudioInput,
    /// A speaker or headset.
    AudioOutput,
}

/// Raw device record as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDeviceInfo {
    /// Device kind.
    pub kind: DeviceKind,
    /// Opaque identifier, stable for the lifetime of the page.
    pub device_id: String,
    /// Human-readable label; empty until permission has been granted.
    pub label: String,
    /// Facing reported by the platform, if it knows.
    pub facing: Option<Facing>,
}

/// How the stream should select a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    /// Any camera will do.
    Any,
    /// Exactly this device.
    Exact(String),
    /// A camera facing this way.
    Facing(Facing),
}

/// Constraints for opening a video stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Device selection.
    pub selector: DeviceSelector,
    /// Preferred width; the platform may deliver something else.
    pub ideal_width: u32,
    /// Preferred height; the platform may deliver something else.
    pub ideal_height: u32,
}

impl StreamConstraints {
    /// Bare constraints used only to trigger a permission prompt.
    pub fn any() -> Self {
        Self {
            selector: DeviceSelector::Any,
            ideal_width: 0,
            ideal_height: 0,
        }
    }
}

/// Settings a live track actually ended up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSettings {
    /// Device that backs the track.
    pub device_id: String,
    /// Native frame width.
    pub width: u32,
    /// Native frame height.
    pub height: u32,
    /// Facing, if the platform reports it.
    pub facing: Option<Facing>,
}

/// A live camera stream.
///
/// Dropping a stream without calling [`stop`](MediaStream::stop) is a
/// leak on real hardware; callers own the handle exclusively and must
/// stop it.
pub trait MediaStream {
    /// Returns the settings of the video track.
    fn settings(&self) -> TrackSettings;

    /// Reads the frame currently shown by the stream.
    fn read_frame(&mut self) -> Result<RgbImage, MediaError>;

    /// Stops every track of the stream. Safe to call more than once.
    fn stop(&mut self);

    /// Returns true until [`stop`](MediaStream::stop) has been called.
    fn is_live(&self) -> bool;
}

/// A host offering camera enumeration and stream acquisition.
#[allow(async_fn_in_trait)]
pub trait MediaPlatform {
    /// Stream handle produced by [`open`](MediaPlatform::open).
    type Stream: MediaStream;

    /// Whether the host exposes a camera API at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Lists every media device in platform order.
    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, MediaError>;

    /// Opens a video stream. May suspend on a permission prompt.
    async fn open(&self, constraints: &StreamConstraints) -> Result<Self::Stream, MediaError>;
}
