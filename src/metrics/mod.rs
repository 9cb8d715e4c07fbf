//! Prometheus metrics for the camera layer.
//!
//! # Metrics Exposed
//!
//! - `camera_capture_session_active` - Whether a stream is active (1/0)
//! - `camera_capture_starts_total` - Starts attempted
//! - `camera_capture_activations_total` - Starts that became active
//! - `camera_capture_failures_total` - Starts that failed
//! - `camera_capture_late_releases_total` - Streams released after losing a race to a stop
//! - `camera_capture_stops_total` - Streams released by a stop
//! - `camera_capture_captures_total` - Stills captured
//!
//! # Example
//!
//! ```no_run
//! use camera_capture::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     is_active: true,
//!     starts: 2,
//!     activations: 2,
//!     captures: 1,
//!     ..Default::default()
//! };
//!
//! registry.update(&snapshot);
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
