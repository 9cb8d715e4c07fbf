//! Form glue around the captured photo.
//!
//! The captured image travels as a base64 data URL in a hidden field.
//! Submitting validates required inputs and shows a loading state; the
//! receiving side decodes the URL and stores the image file.

mod fields;
mod upload;

pub use fields::{PhotoForm, Submission, IMAGE_FIELD};
pub use upload::{decode_data_url, SavedUpload, UploadStore};

use thiserror::Error;

/// Errors raised by the form and upload handling.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("unknown form field: {0}")]
    UnknownField(String),
    #[error("required fields are empty: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("no photo has been captured")]
    MissingImage,
    #[error("invalid image data: {0}")]
    InvalidDataUrl(String),
    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}
