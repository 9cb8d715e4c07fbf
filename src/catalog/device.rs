//! Camera device snapshot.

use crate::platform::MediaDeviceInfo;
use crate::session::Facing;

const FRONT_WORDS: &[&str] = &["front", "user", "facetime"];
const BACK_WORDS: &[&str] = &["back", "rear", "environment"];

/// A camera as listed in the selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    id: String,
    label: String,
    facing: Option<Facing>,
    position: usize,
}

impl CameraDevice {
    /// Builds a device from an enumeration record at `position` (0-based)
    /// among the video inputs.
    pub fn from_info(info: &MediaDeviceInfo, position: usize) -> Self {
        Self {
            id: info.device_id.clone(),
            label: info.label.clone(),
            facing: info.facing.or_else(|| infer_facing(&info.label)),
            position,
        }
    }

    /// Opaque device identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw label; empty before permission is granted.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Facing hint, if known.
    pub fn facing(&self) -> Option<Facing> {
        self.facing
    }

    /// Label to show, falling back to `Camera N`.
    pub fn display_name(&self) -> String {
        if self.label.is_empty() {
            format!("Camera {}", self.position + 1)
        } else {
            self.label.clone()
        }
    }
}

fn infer_facing(label: &str) -> Option<Facing> {
    let label = label.to_lowercase();
    if FRONT_WORDS.iter().any(|w| label.contains(w)) {
        Some(Facing::Front)
    } else if BACK_WORDS.iter().any(|w| label.contains(w)) {
        Some(Facing::Back)
    } else {
        None
    }
}
