//! Camera enumeration for the selection control.
//!
//! Platforms hide device labels until the page has been granted camera
//! access once, so a refresh asks for permission, drops the granted
//! stream immediately and only then enumerates.

mod device;

pub use device::CameraDevice;

use crate::platform::{DeviceKind, MediaPlatform, MediaStream, StreamConstraints};
use crate::session::CameraError;

/// Outcome of the last catalog refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
    /// Never refreshed.
    NotLoaded,
    /// Refreshed; at least one camera.
    Ready,
    /// Refreshed; no cameras.
    Empty,
    /// Permission or enumeration failed.
    Error,
}

impl CatalogStatus {
    /// Placeholder text of the selection control.
    pub fn prompt(self) -> &'static str {
        match self {
            CatalogStatus::NotLoaded => "Loading cameras...",
            CatalogStatus::Ready => "Select camera...",
            CatalogStatus::Empty => "No cameras found",
            CatalogStatus::Error => "Error loading cameras",
        }
    }
}

/// The list of cameras a user can pick from.
#[derive(Debug, Clone)]
pub struct DeviceCatalog {
    devices: Vec<CameraDevice>,
    status: CatalogStatus,
}

impl DeviceCatalog {
    /// Creates an empty, unloaded catalog.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            status: CatalogStatus::NotLoaded,
        }
    }

    /// Requests camera access once to unlock labels, then releases it.
    pub async fn request_permission<P: MediaPlatform>(platform: &P) -> Result<(), CameraError> {
        if !platform.is_supported() {
            return Err(CameraError::UnsupportedPlatform);
        }
        let mut stream = platform.open(&StreamConstraints::any()).await?;
        stream.stop();
        tracing::debug!("Camera permission granted");
        Ok(())
    }

    /// Lists video inputs in platform order. An empty list is not an error.
    pub async fn list_devices<P: MediaPlatform>(
        platform: &P,
    ) -> Result<Vec<CameraDevice>, CameraError> {
        if !platform.is_supported() {
            return Err(CameraError::UnsupportedPlatform);
        }
        let infos = platform.enumerate_devices().await?;
        Ok(infos
            .iter()
            .filter(|info| info.kind == DeviceKind::VideoInput)
            .enumerate()
            .map(|(position, info)| CameraDevice::from_info(info, position))
            .collect())
    }

    /// Requests permission and re-enumerates.
    ///
    /// On failure the catalog is left empty with [`CatalogStatus::Error`]
    /// and the error is returned for the caller to surface.
    pub async fn refresh<P: MediaPlatform>(&mut self, platform: &P) -> Result<(), CameraError> {
        self.devices.clear();

        let listed = match Self::request_permission(platform).await {
            Ok(()) => Self::list_devices(platform).await,
            // with nothing to open there is nothing to list
            Err(CameraError::NoDeviceFound) => Ok(Vec::new()),
            Err(e) => Err(e),
        };

        match listed {
            Ok(devices) => {
                self.devices = devices;
                self.status = if self.devices.is_empty() {
                    CatalogStatus::Empty
                } else {
                    CatalogStatus::Ready
                };
                tracing::info!(count = self.devices.len(), "Camera catalog refreshed");
                Ok(())
            }
            Err(e) => {
                self.status = CatalogStatus::Error;
                tracing::warn!(error = %e, "Failed to load camera list");
                Err(e)
            }
        }
    }

    /// Cameras from the last refresh.
    pub fn devices(&self) -> &[CameraDevice] {
        &self.devices
    }

    /// Looks up a camera by identifier.
    pub fn find(&self, id: &str) -> Option<&CameraDevice> {
        self.devices.iter().find(|d| d.id() == id)
    }

    /// Status of the last refresh.
    pub fn status(&self) -> CatalogStatus {
        self.status
    }

    /// Returns true if no cameras are known.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Returns true if switching between cameras makes sense.
    pub fn has_multiple(&self) -> bool {
        self.devices.len() > 1
    }
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        Self::new()
    }
}
