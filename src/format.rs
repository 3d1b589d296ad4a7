//! Supported output formats and their MIME/extension mappings.
//!
//! The facade speaks exactly three formats: JPEG, PNG, and GIF. Anything else
//! is rejected at the boundary with [`ImageError::UnsupportedFormat`] rather
//! than passed through to a backend that may or may not handle it.

use crate::error::ImageError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    /// Canonical file extension. JPEG reports `jpg`, not `jpeg`.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    /// Parse a format name, extension, or MIME type, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "image/jpeg" | "image/pjpeg" => Some(Self::Jpeg),
            "png" | "image/png" | "image/x-png" => Some(Self::Png),
            "gif" | "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|ext| ext.to_str()).and_then(Self::parse)
    }

    pub(crate) fn from_image(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Gif => Some(Self::Gif),
            _ => None,
        }
    }
}

/// Parse a format name, failing with [`ImageError::UnsupportedFormat`].
pub fn check_format(name: &str) -> Result<ImageFormat, ImageError> {
    ImageFormat::parse(name).ok_or_else(|| ImageError::UnsupportedFormat(name.to_string()))
}
