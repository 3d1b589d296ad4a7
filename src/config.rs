//! Per-image configuration.
//!
//! An [`ImageConfig`] is fixed at construction time: the pixel engine, the
//! default encode quality, whether EXIF orientation is corrected on load, and
//! an optional default background for operations that expose new canvas.
//! Every field has a sensible default, so `ImageConfig::default()` is the
//! common case.

use crate::color::Rgba;
use serde::{Deserialize, Serialize};

/// Which pixel engine backs an image. Chosen once, at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Eager in-memory RGBA buffer; every operation runs immediately.
    #[default]
    Raster,
    /// Format-aware handle that preserves the decoded color layout until
    /// encode time.
    Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub engine: Engine,
    /// Default encode quality, 1 through 100. Out-of-range per-call
    /// overrides fall back to this value.
    pub quality: u8,
    /// Apply the EXIF orientation correction during load.
    pub auto_orient: bool,
    /// Background for crops, rotations, and thumbnails that expose canvas.
    /// `None` falls back per operation (opaque white, or transparent for
    /// PNG thumbnails).
    pub background: Option<Rgba>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            quality: 82,
            auto_orient: true,
            background: None,
        }
    }
}

impl ImageConfig {
    pub fn with_engine(engine: Engine) -> Self {
        Self { engine, ..Self::default() }
    }

    /// The effective quality for one encode call.
    pub(crate) fn effective_quality(&self, requested: Option<u8>) -> u8 {
        match requested {
            Some(q) if (1..=100).contains(&q) => q,
            _ => self.quality,
        }
    }
}
