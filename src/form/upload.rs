//! Decoding and storing submitted photos.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Local;

use super::FormError;
use crate::config::UploadConfig;

/// Hex digits of the content digest appended to every file name.
const DIGEST_CHARS: usize = 8;

/// Decodes a `data:<mime>;base64,<payload>` URL or a bare base64 payload.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, FormError> {
    let payload = match data_url.split_once(',') {
        Some((header, payload)) => {
            if !header.starts_with("data:") || !header.ends_with(";base64") {
                return Err(FormError::InvalidDataUrl(format!(
                    "unsupported header '{}'",
                    header
                )));
            }
            payload
        }
        None => data_url,
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| FormError::InvalidDataUrl(e.to_string()))?;
    if bytes.is_empty() {
        return Err(FormError::InvalidDataUrl("empty image".to_string()));
    }
    Ok(bytes)
}

/// A photo written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedUpload {
    /// Location on disk.
    pub path: PathBuf,
    /// Public URL of the file.
    pub url: String,
}

/// Writes submitted photos under a served directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    url_prefix: String,
}

impl UploadStore {
    /// Creates a store writing into `dir`, served under `url_prefix`.
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a store from the upload configuration.
    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.dir.clone(), &config.url_prefix)
    }

    /// Directory receiving the files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decodes `data_url` and writes it as
    /// `<name>_<YYYYmmdd_HHMMSS>_<digest>.jpg`.
    pub fn save(&self, name: &str, data_url: &str) -> Result<SavedUpload, FormError> {
        let bytes = decode_data_url(data_url)?;
        std::fs::create_dir_all(&self.dir)?;

        let digest = blake3::hash(&bytes).to_hex();
        let filename = format!(
            "{}_{}_{}.jpg",
            sanitize_name(name),
            Local::now().format("%Y%m%d_%H%M%S"),
            &digest.as_str()[..DIGEST_CHARS]
        );
        let path = self.dir.join(&filename);
        std::fs::write(&path, &bytes)?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved uploaded photo");

        Ok(SavedUpload {
            path,
            url: format!("{}/{}", self.url_prefix, filename),
        })
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}
