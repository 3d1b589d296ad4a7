//! Error types for the facade.
//!
//! Validation errors are raised at the [`Image`](crate::Image) boundary before
//! any backend call. Backend-reported failures are mapped onto the matching
//! [`ImageError`] kind with the failing operation named in the message.

use crate::backend::BackendError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    /// Non-numeric or out-of-range geometry, angle, or color arguments.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// File missing, unreadable, or malformed base64 / data URI.
    #[error("source unreadable: {0}")]
    SourceUnreadable(String),

    /// Format or MIME type outside JPEG/PNG/GIF.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The backend could not parse the bytes as any supported image.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// The backend could not produce output bytes.
    #[error("encode failed: {0}")]
    EncodeFailed(String),

    /// The destination path could not be written.
    #[error("write failed ({}): {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A transform or save was attempted on an empty image.
    #[error("no image loaded")]
    NotLoaded,

    /// `revert` was called on an image constructed from memory.
    #[error("cannot revert an image without a source path")]
    RevertWithoutSource,
}

impl ImageError {
    /// Map a backend failure onto the matching error kind, naming the
    /// operation that failed.
    pub(crate) fn from_backend(op: &'static str, err: BackendError) -> Self {
        match err {
            BackendError::Decode(detail) => Self::DecodeFailed(format!("{op}: {detail}")),
            BackendError::Encode(detail) => Self::EncodeFailed(format!("{op}: {detail}")),
            BackendError::Unsupported(detail) => {
                Self::UnsupportedFormat(format!("{op}: {detail}"))
            }
            BackendError::Disposed => Self::NotLoaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_decode_maps_to_decode_failed() {
        let err = ImageError::from_backend("resize", BackendError::Decode("bad scan".into()));
        assert!(matches!(err, ImageError::DecodeFailed(msg) if msg == "resize: bad scan"));
    }

    #[test]
    fn backend_disposed_maps_to_not_loaded() {
        let err = ImageError::from_backend("crop", BackendError::Disposed);
        assert!(matches!(err, ImageError::NotLoaded));
    }
}
