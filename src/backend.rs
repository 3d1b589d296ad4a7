//! Pixel backend abstraction.
//!
//! The facade never touches pixels itself; it validates, computes geometry,
//! and then talks to a [`PixelBackend`]. A backend owns at most one pixel
//! buffer at a time and reports its dimensions through [`PixelBackend::probe`].
//! Crop accepts a signed origin: components outside the source mean the
//! window overhangs the image and the overhang is filled with the supplied
//! background. That single primitive gives thumbnails their exact target box
//! without a separate padding operation.
//!
//! Two engines implement the trait with identical geometry and error
//! behavior; they differ only in how they hold pixels between operations.

use crate::color::Rgba;
use crate::config::Engine;
use crate::format::ImageFormat;
use image::ImageReader;
use std::io::Cursor;
use thiserror::Error;

mod command;
mod raster;

pub use command::CommandBackend;
pub use raster::RasterBackend;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("decode: {0}")]
    Decode(String),
    #[error("encode: {0}")]
    Encode(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// Operation attempted with no pixel buffer present.
    #[error("no pixel buffer")]
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// What a byte probe learns about an encoded image without a full decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
    Both,
}

/// A stateful pixel engine. Object safe; the facade holds a boxed instance.
pub trait PixelBackend {
    /// Identify format and dimensions from encoded bytes without decoding
    /// the full image.
    fn probe_bytes(&self, bytes: &[u8]) -> Result<SourceInfo, BackendError>;

    /// Decode encoded bytes into the owned buffer, replacing any previous
    /// content.
    fn decode(&mut self, bytes: &[u8]) -> Result<(), BackendError>;

    /// Create a blank buffer of the given size and color.
    fn create(&mut self, width: u32, height: u32, color: Rgba) -> Result<(), BackendError>;

    /// Current buffer dimensions, `None` when disposed or never loaded.
    fn probe(&self) -> Option<Dimensions>;

    fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError>;

    /// Extract a `width` x `height` window whose top-left corner is at the
    /// signed source position `(x, y)`. Out-of-source area is `background`.
    fn crop(
        &mut self,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        background: Rgba,
    ) -> Result<(), BackendError>;

    /// Rotate clockwise by `degrees`. Right angles are lossless; other
    /// angles expand the canvas and fill the corners with `background`.
    fn rotate(&mut self, degrees: i32, background: Rgba) -> Result<(), BackendError>;

    fn flip(&mut self, axis: FlipAxis) -> Result<(), BackendError>;

    /// Flatten the buffer onto a solid backdrop.
    fn fill_background(&mut self, color: Rgba) -> Result<(), BackendError>;

    /// Encode the buffer. `quality` only affects JPEG.
    fn encode(&self, format: ImageFormat, quality: u8) -> Result<Vec<u8>, BackendError>;

    /// Release the buffer. Safe to call repeatedly.
    fn dispose(&mut self);
}

/// Construct the backend for an engine choice.
pub(crate) fn create(engine: Engine) -> Box<dyn PixelBackend> {
    match engine {
        Engine::Raster => Box::new(RasterBackend::new()),
        Engine::Command => Box::new(CommandBackend::new()),
    }
}

/// Shared byte probe. Both engines sniff with the same reader, so format
/// and dimension reporting cannot drift between them.
pub(crate) fn sniff(bytes: &[u8]) -> Result<SourceInfo, BackendError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| BackendError::Decode(e.to_string()))?;
    let guessed = reader
        .format()
        .ok_or_else(|| BackendError::Unsupported("unrecognized image bytes".into()))?;
    let format = ImageFormat::from_image(guessed)
        .ok_or_else(|| BackendError::Unsupported(format!("{guessed:?} input")))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(SourceInfo { width, height, format })
}
