//! The error taxonomy of sample construction.
//!
//! Functions in this crate return [anyhow::Result]. Failures that callers may
//! want to tell apart are raised as [DataError] and can be recovered with
//! `error.downcast_ref::<DataError>()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    /// Invalid configuration or dataset layout. Raised at construction.
    #[error("configuration error: {0}")]
    Config(String),
    /// A file could not be read or decoded.
    #[error("failed to decode '{}': {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    /// The source is smaller than the crop window.
    #[error(
        "source of size {src_h}x{src_w} is smaller than the crop window {crop_h}x{crop_w}"
    )]
    Geometry {
        src_h: i64,
        src_w: i64,
        crop_h: i64,
        crop_w: i64,
    },
    #[error("index {index} is out of range for {len} samples")]
    IndexOutOfRange { index: usize, len: usize },
}

impl DataError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
