//! Camera and upload configuration.
//!
//! The requested resolution is only an ideal hint; the platform decides
//! the native frame size, and captures always use whatever it delivered.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::session::Facing;

/// Configuration for the camera session and still capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Preferred frame width in pixels.
    pub ideal_width: u32,
    /// Preferred frame height in pixels.
    pub ideal_height: u32,
    /// JPEG quality factor for captured stills (1-100).
    pub jpeg_quality: u8,
    /// Pause between stopping one camera and starting the other on switch.
    pub switch_delay_ms: u64,
    /// Facing requested when nothing else selects a camera.
    pub default_facing: Facing,
    /// Restart a camera that was hidden while active once the page is visible again.
    pub resume_on_visible: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            ideal_width: 840,
            ideal_height: 680,
            jpeg_quality: 90,
            switch_delay_ms: 300,
            default_facing: Facing::Front,
            resume_on_visible: true,
        }
    }
}

impl CameraConfig {
    /// Creates a new configuration with the specified ideal dimensions.
    pub fn with_dimensions(ideal_width: u32, ideal_height: u32) -> Self {
        Self {
            ideal_width,
            ideal_height,
            ..Default::default()
        }
    }

    /// Delay applied by a facing switch.
    pub fn switch_delay(&self) -> Duration {
        Duration::from_millis(self.switch_delay_ms)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ideal_width == 0 || self.ideal_height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ConfigError::InvalidQuality);
        }
        if self.switch_delay_ms > 10_000 {
            return Err(ConfigError::InvalidSwitchDelay);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid ideal frame dimensions")]
    InvalidDimensions,
    #[error("invalid JPEG quality (must be 1-100)")]
    InvalidQuality,
    #[error("invalid switch delay (must be at most 10000 ms)")]
    InvalidSwitchDelay,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Where submitted photos are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory that receives saved images.
    pub dir: PathBuf,
    /// Public URL prefix under which `dir` is served.
    pub url_prefix: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static/uploads"),
            url_prefix: "/static/uploads".to_string(),
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.camera.validate()?;
        Ok(config)
    }
}
