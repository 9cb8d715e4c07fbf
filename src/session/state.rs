//! Session states, facing and page lifecycle inputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which way a camera points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Toward the user. Previews and captures are mirrored.
    Front,
    /// Away from the user.
    Back,
}

impl Facing {
    /// Returns the opposite facing.
    pub fn flipped(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }

    /// Whether frames from this facing are shown mirrored.
    #[inline]
    pub fn is_mirrored(self) -> bool {
        self == Facing::Front
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::Front => f.write_str("front"),
            Facing::Back => f.write_str("back"),
        }
    }
}

impl FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" | "user" => Ok(Facing::Front),
            "back" | "environment" => Ok(Facing::Back),
            other => Err(format!("unknown facing '{}'", other)),
        }
    }
}

/// Lifecycle state of a [`CameraSession`](super::CameraSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No stream held.
    Idle,
    /// Waiting on the platform to open a stream.
    Starting,
    /// Streaming into the preview surface.
    Active,
    /// Releasing the stream.
    Stopping,
    /// The last start failed; always followed by `Idle`.
    Failed,
}

/// Signals from the hosting page that drive the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// The page went to the background.
    Hidden,
    /// The page is in the foreground again.
    Visible,
    /// The page is going away.
    Unload,
}

/// What the preview surface shows while a session is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveStream {
    /// Device backing the stream.
    pub device_id: String,
    /// Resolved facing of that device.
    pub facing: Facing,
    /// Whether the preview is flipped horizontally.
    pub mirrored: bool,
    /// Native frame width.
    pub width: u32,
    /// Native frame height.
    pub height: u32,
}

/// How a call to [`start`](super::CameraSession::start) ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The session is active on this stream.
    Started(ActiveStream),
    /// A stop or a newer start arrived first; the late stream was released.
    Superseded,
}

/// Lifetime counters of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Starts attempted.
    pub starts: u64,
    /// Starts that reached `Active`.
    pub activations: u64,
    /// Starts that ended in `Failed`.
    pub failures: u64,
    /// Streams that arrived after their start was superseded.
    pub late_releases: u64,
    /// Streams released by a stop.
    pub stops: u64,
}
