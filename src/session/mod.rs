//! Camera session lifecycle.
//!
//! A [`CameraSession`] owns the one live stream a page may hold. It moves
//! through `Idle → Starting → Active → Stopping → Idle`, or
//! `Starting → Failed → Idle` when the platform refuses, and publishes
//! every transition to subscribers.

mod error;
mod lifecycle;
mod state;

pub use error::CameraError;
pub use lifecycle::CameraSession;
pub use state::{ActiveStream, Facing, PageEvent, SessionState, SessionStats, StartOutcome};
