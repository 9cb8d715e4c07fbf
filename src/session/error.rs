//! Camera errors surfaced to the user.

use thiserror::Error;

use crate::platform::MediaError;

/// Errors that can occur while driving the camera.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    NoDeviceFound,
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("no active camera session")]
    NoActiveSession,
    #[error("camera access not supported")]
    UnsupportedPlatform,
}

impl CameraError {
    /// Message shown to the user when this error is surfaced.
    pub fn user_message(&self) -> String {
        match self {
            CameraError::PermissionDenied => {
                "Camera access denied. Please allow camera access in your browser settings."
                    .to_string()
            }
            CameraError::NoDeviceFound => {
                "No camera found. Please make sure your device has a camera.".to_string()
            }
            CameraError::DeviceUnavailable(reason) => format!("Error accessing camera: {}", reason),
            CameraError::NoActiveSession => "Camera is not active.".to_string(),
            CameraError::UnsupportedPlatform => {
                "Sorry, your browser does not support camera access.".to_string()
            }
        }
    }
}

impl From<MediaError> for CameraError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::NotAllowed => CameraError::PermissionDenied,
            MediaError::NotFound => CameraError::NoDeviceFound,
            MediaError::NotReadable(reason) => CameraError::DeviceUnavailable(reason),
            MediaError::Unsupported => CameraError::UnsupportedPlatform,
        }
    }
}
