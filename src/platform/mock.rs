//! In-memory media platform for tests and demos.
//!
//! Generates synthetic frames and keeps an exact count of open stream
//! handles, so leaks show up as a non-zero count after a session stops.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use image::{Rgb, RgbImage};
use tokio::sync::Semaphore;

use super::{
    DeviceKind, DeviceSelector, MediaDeviceInfo, MediaError, MediaPlatform, MediaStream,
    StreamConstraints, TrackSettings,
};
use crate::session::Facing;

/// Left half of every synthetic frame.
pub const LEFT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// Right half of every synthetic frame.
pub const RIGHT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// A fake camera known to [`MockPlatform`].
#[derive(Debug, Clone)]
pub struct MockDevice {
    /// Device identifier.
    pub id: String,
    /// Label revealed once permission is granted.
    pub label: String,
    /// Reported facing.
    pub facing: Option<Facing>,
    /// Native frame width.
    pub width: u32,
    /// Native frame height.
    pub height: u32,
}

impl MockDevice {
    /// Creates a 640x480 device.
    pub fn new(id: &str, label: &str, facing: Option<Facing>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            facing,
            width: 640,
            height: 480,
        }
    }
}

#[derive(Debug, Default)]
struct Handles {
    open: Cell<usize>,
    peak: Cell<usize>,
    opened: Cell<usize>,
    permission_granted: Cell<bool>,
}

/// Mock platform with configurable devices and failures.
#[derive(Debug)]
pub struct MockPlatform {
    devices: Vec<MockDevice>,
    supported: bool,
    deny: Cell<bool>,
    failure: Option<MediaError>,
    gate: Option<Arc<Semaphore>>,
    handles: Rc<Handles>,
}

impl MockPlatform {
    /// Creates a platform with a front and a back camera.
    pub fn new() -> Self {
        Self::with_devices(vec![
            MockDevice::new("cam-front", "Front Camera", Some(Facing::Front)),
            MockDevice::new("cam-back", "Back Camera", Some(Facing::Back)),
        ])
    }

    /// Creates a platform with the given cameras.
    pub fn with_devices(devices: Vec<MockDevice>) -> Self {
        Self {
            devices,
            supported: true,
            deny: Cell::new(false),
            failure: None,
            gate: None,
            handles: Rc::new(Handles::default()),
        }
    }

    /// Every open request is refused as if the user clicked "Block".
    pub fn deny_permission(self) -> Self {
        self.deny.set(true);
        self
    }

    /// Every open request fails with `error`.
    pub fn fail_open(mut self, error: MediaError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Reports no camera API at all.
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// Makes every open wait for a permit from `gate`, standing in for a
    /// permission prompt the user has not answered yet.
    pub fn with_open_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Changes the permission answer for subsequent opens.
    pub fn set_denied(&self, denied: bool) {
        self.deny.set(denied);
    }

    /// Number of streams currently open.
    pub fn open_streams(&self) -> usize {
        self.handles.open.get()
    }

    /// Highest number of streams ever open at the same time.
    pub fn peak_open_streams(&self) -> usize {
        self.handles.peak.get()
    }

    /// Total number of streams handed out.
    pub fn streams_opened(&self) -> usize {
        self.handles.opened.get()
    }

    fn select(&self, selector: &DeviceSelector) -> Result<&MockDevice, MediaError> {
        match selector {
            DeviceSelector::Exact(id) => self
                .devices
                .iter()
                .find(|d| &d.id == id)
                .ok_or(MediaError::NotFound),
            // facingMode is a preference, so any camera satisfies it
            DeviceSelector::Facing(facing) => self
                .devices
                .iter()
                .find(|d| d.facing == Some(*facing))
                .or_else(|| self.devices.first())
                .ok_or(MediaError::NotFound),
            DeviceSelector::Any => self.devices.first().ok_or(MediaError::NotFound),
        }
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaPlatform for MockPlatform {
    type Stream = MockStream;

    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, MediaError> {
        if !self.supported {
            return Err(MediaError::Unsupported);
        }
        let reveal = self.handles.permission_granted.get();
        let mut infos: Vec<MediaDeviceInfo> = self
            .devices
            .iter()
            .map(|d| MediaDeviceInfo {
                kind: DeviceKind::VideoInput,
                device_id: d.id.clone(),
                label: if reveal { d.label.clone() } else { String::new() },
                facing: d.facing,
            })
            .collect();
        infos.push(MediaDeviceInfo {
            kind: DeviceKind::AudioInput,
            device_id: "mic-default".to_string(),
            label: if reveal {
                "Built-in Microphone".to_string()
            } else {
                String::new()
            },
            facing: None,
        });
        Ok(infos)
    }

    async fn open(&self, constraints: &StreamConstraints) -> Result<MockStream, MediaError> {
        if !self.supported {
            return Err(MediaError::Unsupported);
        }
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if self.deny.get() {
            return Err(MediaError::NotAllowed);
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let device = self.select(&constraints.selector)?;
        let handles = &self.handles;
        handles.permission_granted.set(true);
        handles.open.set(handles.open.get() + 1);
        handles.opened.set(handles.opened.get() + 1);
        handles.peak.set(handles.peak.get().max(handles.open.get()));

        tracing::debug!(device = %device.id, open = handles.open.get(), "MockPlatform opened stream");

        Ok(MockStream {
            settings: TrackSettings {
                device_id: device.id.clone(),
                width: device.width,
                height: device.height,
                facing: device.facing,
            },
            handles: Rc::clone(&self.handles),
            live: true,
        })
    }
}

/// Stream handed out by [`MockPlatform`].
#[derive(Debug)]
pub struct MockStream {
    settings: TrackSettings,
    handles: Rc<Handles>,
    live: bool,
}

impl MediaStream for MockStream {
    fn settings(&self) -> TrackSettings {
        self.settings.clone()
    }

    fn read_frame(&mut self) -> Result<RgbImage, MediaError> {
        if !self.live {
            return Err(MediaError::NotReadable("track ended".to_string()));
        }
        let half = self.settings.width / 2;
        Ok(RgbImage::from_fn(
            self.settings.width,
            self.settings.height,
            |x, _| if x < half { LEFT_COLOR } else { RIGHT_COLOR },
        ))
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.handles.open.set(self.handles.open.get() - 1);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_labels_hidden_until_permission() {
        let platform = MockPlatform::new();

        let before = platform.enumerate_devices().await.unwrap();
        assert!(before.iter().all(|d| d.label.is_empty()));

        let mut stream = platform.open(&StreamConstraints::any()).await.unwrap();
        stream.stop();

        let after = platform.enumerate_devices().await.unwrap();
        assert_eq!(after[0].label, "Front Camera");
    }

    #[tokio::test]
    async fn test_handle_accounting() {
        let platform = MockPlatform::new();
        let mut a = platform.open(&StreamConstraints::any()).await.unwrap();
        let mut b = platform.open(&StreamConstraints::any()).await.unwrap();
        assert_eq!(platform.open_streams(), 2);
        assert_eq!(platform.peak_open_streams(), 2);

        a.stop();
        a.stop();
        assert_eq!(platform.open_streams(), 1);
        b.stop();
        assert_eq!(platform.open_streams(), 0);
        assert_eq!(platform.streams_opened(), 2);
    }

    #[tokio::test]
    async fn test_facing_falls_back_to_first_camera() {
        let platform = MockPlatform::with_devices(vec![MockDevice::new(
            "only",
            "USB Camera",
            None,
        )]);
        let constraints = StreamConstraints {
            selector: DeviceSelector::Facing(Facing::Back),
            ideal_width: 840,
            ideal_height: 680,
        };
        let mut stream = platform.open(&constraints).await.unwrap();
        assert_eq!(stream.settings().device_id, "only");
        stream.stop();
    }

    #[tokio::test]
    async fn test_exact_unknown_device_not_found() {
        let platform = MockPlatform::new();
        let constraints = StreamConstraints {
            selector: DeviceSelector::Exact("missing".to_string()),
            ideal_width: 840,
            ideal_height: 680,
        };
        assert_eq!(platform.open(&constraints).await.err(), Some(MediaError::NotFound));
    }

    #[tokio::test]
    async fn test_stopped_stream_unreadable() {
        let platform = MockPlatform::new();
        let mut stream = platform.open(&StreamConstraints::any()).await.unwrap();
        assert!(stream.read_frame().is_ok());
        stream.stop();
        assert!(!stream.is_live());
        assert!(stream.read_frame().is_err());
    }
}
