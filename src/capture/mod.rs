//! Still capture from the live preview.
//!
//! The current frame is drawn into an off-screen raster at its native
//! resolution, flipped horizontally for front cameras so the still matches
//! the mirrored preview, and encoded as JPEG.

mod frame;
mod raster;
mod sink;

pub use frame::{CapturedFrame, JPEG_MIME};
pub use raster::{Raster, Transform};
pub use sink::{CaptureError, CaptureSink, SinkMode};
