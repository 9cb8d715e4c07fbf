//! Native camera backend over `nokhwa`.
//!
//! Desktop capture APIs have no permission prompt and no facing mode, so
//! `NotAllowed` never occurs here and facing requests fall back to the
//! first enumerated camera.

use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::{Camera, NokhwaError};

use super::{
    DeviceKind, DeviceSelector, MediaDeviceInfo, MediaError, MediaPlatform, MediaStream,
    StreamConstraints, TrackSettings,
};

const FALLBACK_FPS: u32 = 30;

impl From<NokhwaError> for MediaError {
    fn from(e: NokhwaError) -> Self {
        MediaError::NotReadable(e.to_string())
    }
}

/// Platform backed by the operating system's camera API.
#[derive(Debug, Default)]
pub struct NativePlatform;

impl NativePlatform {
    /// Creates the native platform.
    pub fn new() -> Self {
        Self
    }

    fn resolve_index(&self, selector: &DeviceSelector) -> Result<CameraIndex, MediaError> {
        match selector {
            DeviceSelector::Exact(id) => match id.parse::<u32>() {
                Ok(n) => Ok(CameraIndex::Index(n)),
                Err(_) => Ok(CameraIndex::String(id.clone())),
            },
            DeviceSelector::Facing(_) | DeviceSelector::Any => {
                let cameras = nokhwa::query(ApiBackend::Auto)?;
                cameras
                    .first()
                    .map(|info| info.index().clone())
                    .ok_or(MediaError::NotFound)
            }
        }
    }
}

impl MediaPlatform for NativePlatform {
    type Stream = NativeStream;

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, MediaError> {
        let cameras = nokhwa::query(ApiBackend::Auto)?;
        Ok(cameras
            .iter()
            .map(|info| MediaDeviceInfo {
                kind: DeviceKind::VideoInput,
                device_id: info.index().to_string(),
                label: info.human_name(),
                facing: None,
            })
            .collect())
    }

    async fn open(&self, constraints: &StreamConstraints) -> Result<NativeStream, MediaError> {
        let index = self.resolve_index(&constraints.selector)?;
        let device_id = index.to_string();

        let requested = if constraints.ideal_width > 0 && constraints.ideal_height > 0 {
            let target = CameraFormat::new(
                Resolution::new(constraints.ideal_width, constraints.ideal_height),
                FrameFormat::MJPEG,
                FALLBACK_FPS,
            );
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(target))
        } else {
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::None)
        };

        let mut camera = Camera::new(index, requested).map_err(|e| match e {
            NokhwaError::OpenDeviceError(..) => MediaError::NotFound,
            other => MediaError::from(other),
        })?;
        camera.open_stream()?;

        let resolution = camera.resolution();
        tracing::info!(
            device = %device_id,
            width = resolution.width(),
            height = resolution.height(),
            "Native camera stream opened"
        );

        Ok(NativeStream {
            camera,
            device_id,
            live: true,
        })
    }
}

/// A stream on a native camera.
pub struct NativeStream {
    camera: Camera,
    device_id: String,
    live: bool,
}

impl MediaStream for NativeStream {
    fn settings(&self) -> TrackSettings {
        let resolution = self.camera.resolution();
        TrackSettings {
            device_id: self.device_id.clone(),
            width: resolution.width(),
            height: resolution.height(),
            facing: None,
        }
    }

    fn read_frame(&mut self) -> Result<RgbImage, MediaError> {
        if !self.live {
            return Err(MediaError::NotReadable("track ended".to_string()));
        }
        let frame = self.camera.frame()?;
        let decoded = frame.decode_image::<RgbFormat>()?;
        let (width, height) = (decoded.width(), decoded.height());
        // nokhwa links its own `image` version, so hand the pixels over raw
        RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| MediaError::NotReadable("frame size mismatch".to_string()))
    }

    fn stop(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        if let Err(e) = self.camera.stop_stream() {
            tracing::warn!(device = %self.device_id, "Failed to stop camera stream: {}", e);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for NativeStream {
    fn drop(&mut self) {
        self.stop();
    }
}
