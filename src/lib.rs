//! Camera Capture Library
//!
//! Lets a user pick a camera, watch a live preview, capture a still and
//! hand it to a form as a base64 data URL.
//!
//! # Architecture
//!
//! ```text
//! DeviceCatalog → device id → CameraSession → live stream → CaptureSink → PhotoForm
//!                                   ↑
//!                      page events (hidden / visible / unload)
//! ```
//!
//! All hardware access goes through the [`platform::MediaPlatform`] trait.
//! The session holds at most one stream at a time; a start that loses a
//! race against a stop releases its stream as soon as it arrives.
//!
//! # Example
//!
//! ```no_run
//! use camera_capture::{
//!     capture::CaptureSink,
//!     config::CameraConfig,
//!     platform::MockPlatform,
//!     session::{CameraSession, Facing},
//! };
//!
//! # async fn demo() {
//! let session = CameraSession::new(MockPlatform::new(), CameraConfig::default());
//! let mut sink = CaptureSink::from_config(session.config());
//!
//! session.start(None, Some(Facing::Front)).await.unwrap();
//! let still = sink.capture(&session).unwrap();
//! let field_value = still.to_data_url();
//! session.stop();
//! # let _ = field_value;
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod booth;
pub mod capture;
pub mod catalog;
pub mod config;
pub mod form;
pub mod metrics;
pub mod notify;
pub mod platform;
pub mod session;

// Re-export commonly used types at crate root
pub use booth::PhotoBooth;
pub use capture::{CaptureError, CaptureSink, CapturedFrame};
pub use catalog::{CameraDevice, CatalogStatus, DeviceCatalog};
pub use config::{CameraConfig, FileConfig};
pub use form::{PhotoForm, UploadStore};
pub use notify::{LogNotifier, MemoryNotifier, Notifier};
pub use platform::{MediaPlatform, MockPlatform};
pub use session::{CameraError, CameraSession, Facing, PageEvent, SessionState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
