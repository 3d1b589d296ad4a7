//! The image editing facade.
//!
//! An [`Image`] wraps one pixel backend plus the bookkeeping around it:
//! source path, current dimensions, detected format, background color, and
//! lazily read EXIF data. Every operation follows the same shape — validate
//! arguments, compute geometry with the pure helpers, call the backend, then
//! re-probe so the cached dimensions always match the buffer.
//!
//! Transform methods return `Result<&mut Self>` so calls chain:
//!
//! ```no_run
//! use easel::Image;
//!
//! let mut img = Image::load("photo.jpg")?;
//! img.resize_to_best_fit(1200, 1200, false)?
//!     .crop_auto(900, 600, Default::default())?;
//! img.save(Some("out/photo.jpg".as_ref()), Some(85), None)?;
//! # Ok::<(), easel::ImageError>(())
//! ```

use crate::backend::{self, FlipAxis, PixelBackend};
use crate::color::{ColorInput, Rgba};
use crate::config::{Engine, ImageConfig};
use crate::crop::{self, CropAnchor, ScaleAxis};
use crate::error::ImageError;
use crate::format::{check_format, ImageFormat};
use crate::geometry;
use crate::metadata::{ExifData, GpsPosition};
use crate::orientation::{self, Step};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which way a loaded image reads at its current dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayOrientation {
    Landscape,
    Portrait,
    Square,
}

/// Snapshot of an image's metadata, cheap to serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
    pub mime_type: Option<String>,
    pub extension: Option<String>,
    pub orientation: Option<DisplayOrientation>,
}

pub struct Image {
    backend: Box<dyn PixelBackend>,
    config: ImageConfig,
    source_path: Option<PathBuf>,
    width: u32,
    height: u32,
    format: Option<ImageFormat>,
    background: Option<Rgba>,
    /// Outer `None`: EXIF not read yet. `Some(None)`: read, nothing there.
    exif: Option<Option<ExifData>>,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("config", &self.config)
            .field("source_path", &self.source_path)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("background", &self.background)
            .field("exif", &self.exif)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Image {
    fn with_config(config: ImageConfig) -> Self {
        Self {
            backend: backend::create(config.engine),
            background: config.background,
            config,
            source_path: None,
            width: 0,
            height: 0,
            format: None,
            exif: None,
        }
    }

    /// Load from a file with the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        Self::load_with(path, ImageConfig::default())
    }

    pub fn load_with(path: impl AsRef<Path>, config: ImageConfig) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| ImageError::SourceUnreadable(format!("{}: {e}", path.display())))?;
        let mut img = Self::with_config(config);
        img.source_path = Some(path.to_path_buf());
        img.load_bytes(&bytes)?;
        Ok(img)
    }

    /// Load from already encoded bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        Self::from_bytes_with(bytes, ImageConfig::default())
    }

    pub fn from_bytes_with(bytes: &[u8], config: ImageConfig) -> Result<Self, ImageError> {
        let mut img = Self::with_config(config);
        img.load_bytes(bytes)?;
        Ok(img)
    }

    /// Load from a base64 payload. Embedded whitespace is tolerated.
    pub fn from_base64(encoded: &str) -> Result<Self, ImageError> {
        Self::from_base64_with(encoded, ImageConfig::default())
    }

    pub fn from_base64_with(encoded: &str, config: ImageConfig) -> Result<Self, ImageError> {
        let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64
            .decode(cleaned)
            .map_err(|e| ImageError::SourceUnreadable(format!("base64: {e}")))?;
        Self::from_bytes_with(&bytes, config)
    }

    /// Load from a `data:<mime>;base64,<payload>` URI. The declared MIME
    /// type must be one of the supported formats.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageError> {
        Self::from_data_uri_with(uri, ImageConfig::default())
    }

    pub fn from_data_uri_with(uri: &str, config: ImageConfig) -> Result<Self, ImageError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::SourceUnreadable("not a data URI".into()))?;
        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| ImageError::SourceUnreadable("data URI is not base64".into()))?;
        check_format(mime)?;
        Self::from_base64_with(payload, config)
    }

    /// Create a blank image. An absent color means opaque white.
    pub fn create(
        width: u32,
        height: u32,
        color: Option<ColorInput>,
    ) -> Result<Self, ImageError> {
        Self::create_with(width, height, color, ImageConfig::default())
    }

    pub fn create_with(
        width: u32,
        height: u32,
        color: Option<ColorInput>,
        config: ImageConfig,
    ) -> Result<Self, ImageError> {
        nonzero("width", width)?;
        nonzero("height", height)?;
        let fill = crate::color::normalize(color.as_ref())?;
        let mut img = Self::with_config(config);
        img.backend
            .create(width, height, fill)
            .map_err(|e| ImageError::from_backend("create", e))?;
        img.width = width;
        img.height = height;
        // Blank canvases encode as PNG unless told otherwise.
        img.format = Some(ImageFormat::Png);
        img.exif = Some(None);
        Ok(img)
    }

    /// Decode bytes into the backend and reset per-image state.
    fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), ImageError> {
        let info = self
            .backend
            .probe_bytes(bytes)
            .map_err(|e| ImageError::from_backend("probe", e))?;
        self.backend
            .decode(bytes)
            .map_err(|e| ImageError::from_backend("decode", e))?;
        self.width = info.width;
        self.height = info.height;
        self.format = Some(info.format);
        self.exif = None;
        if self.config.auto_orient {
            // The bytes are at hand, so the EXIF cache is settled here; the
            // lazy path only matters when orientation correction is off.
            self.exif = Some(ExifData::from_bytes(bytes));
            self.apply_orientation()?;
        }
        debug!(width = self.width, height = self.height, format = ?info.format, "loaded");
        Ok(())
    }

    fn apply_orientation(&mut self) -> Result<(), ImageError> {
        let Some(Some(data)) = &self.exif else { return Ok(()) };
        let Some(code) = data.orientation() else { return Ok(()) };
        let steps = orientation::steps(code);
        if steps.is_empty() {
            return Ok(());
        }
        let bg = self.background_or_default();
        for step in steps {
            match step {
                Step::FlipHorizontal => self.backend.flip(FlipAxis::Horizontal),
                Step::Rotate90 => self.backend.rotate(90, bg),
                Step::Rotate180 => self.backend.rotate(180, bg),
                Step::Rotate270 => self.backend.rotate(270, bg),
            }
            .map_err(|e| ImageError::from_backend("auto_orient", e))?;
        }
        self.refresh("auto_orient")?;
        // Pixels are upright now; the cached tag must agree.
        if let Some(Some(data)) = &mut self.exif {
            data.set_orientation_normal();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// State queries
// ---------------------------------------------------------------------------

impl Image {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn mime_type(&self) -> Option<&'static str> {
        self.format.map(ImageFormat::mime_type)
    }

    pub fn extension(&self) -> Option<&'static str> {
        self.format.map(ImageFormat::extension)
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn engine(&self) -> Engine {
        self.config.engine
    }

    pub fn background(&self) -> Option<Rgba> {
        self.background
    }

    pub fn is_loaded(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn display_orientation(&self) -> Option<DisplayOrientation> {
        if !self.is_loaded() {
            return None;
        }
        Some(match self.width.cmp(&self.height) {
            std::cmp::Ordering::Greater => DisplayOrientation::Landscape,
            std::cmp::Ordering::Less => DisplayOrientation::Portrait,
            std::cmp::Ordering::Equal => DisplayOrientation::Square,
        })
    }

    pub fn info(&self) -> ImageInfo {
        ImageInfo {
            path: self.source_path.clone(),
            width: self.width,
            height: self.height,
            format: self.format,
            mime_type: self.format.map(|f| f.mime_type().to_string()),
            extension: self.format.map(|f| f.extension().to_string()),
            orientation: self.display_orientation(),
        }
    }

    fn ensure_loaded(&self) -> Result<(), ImageError> {
        if self.is_loaded() { Ok(()) } else { Err(ImageError::NotLoaded) }
    }

    fn background_or_default(&self) -> Rgba {
        self.background.unwrap_or(Rgba::WHITE)
    }

    /// Thumbnails expose new canvas; PNG sources default it to transparent.
    fn canvas_background(&self) -> Rgba {
        self.background.unwrap_or(if self.format == Some(ImageFormat::Png) {
            Rgba::TRANSPARENT
        } else {
            Rgba::WHITE
        })
    }

    fn resolve_color(&self, color: Option<&ColorInput>) -> Result<Rgba, ImageError> {
        match color {
            Some(c) => c.normalize(),
            None => Ok(self.background_or_default()),
        }
    }

    /// Re-probe the backend after a mutation so cached dimensions match.
    fn refresh(&mut self, op: &'static str) -> Result<&mut Self, ImageError> {
        let dims = self.backend.probe().ok_or(ImageError::NotLoaded)?;
        self.width = dims.width;
        self.height = dims.height;
        debug!(op, width = self.width, height = self.height, "applied");
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// EXIF
// ---------------------------------------------------------------------------

impl Image {
    /// Parsed EXIF data, read on first access. Images constructed from
    /// memory with `auto_orient` off have no source to re-read, so they
    /// report none.
    pub fn exif(&mut self) -> Option<&ExifData> {
        if self.exif.is_none() {
            let parsed = self
                .source_path
                .as_ref()
                .and_then(|p| fs::read(p).ok())
                .and_then(|bytes| ExifData::from_bytes(&bytes));
            self.exif = Some(parsed);
        }
        match &self.exif {
            Some(Some(data)) => Some(data),
            _ => None,
        }
    }

    /// One tag by raw name, `exif:` prefix, or friendly alias.
    pub fn exif_value(&mut self, name: &str) -> Option<String> {
        self.exif()?.get(name).map(str::to_string)
    }

    /// Capture timestamp as `YYYY-MM-DD HH:MM:SS`.
    pub fn date_created(&mut self) -> Option<String> {
        self.exif()?.date_created()
    }

    /// GPS position, decimal or degrees/minutes/seconds.
    pub fn gps(&mut self, dms: bool) -> Option<GpsPosition> {
        self.exif()?.gps(dms)
    }
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

impl Image {
    /// Resize to an explicit box. Aspect ratio is not preserved. Without
    /// `allow_enlarge`, targets clamp per axis, and a box that exceeds the
    /// source on both axes leaves the image untouched.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        allow_enlarge: bool,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        nonzero("width", width)?;
        nonzero("height", height)?;
        let dims = geometry::resize(self.dimensions(), width, height, allow_enlarge);
        self.apply_resize("resize", dims)
    }

    pub fn resize_to_width(
        &mut self,
        width: u32,
        allow_enlarge: bool,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        nonzero("width", width)?;
        let dims = geometry::resize_to_width(self.dimensions(), width, allow_enlarge);
        self.apply_resize("resize_to_width", dims)
    }

    pub fn resize_to_height(
        &mut self,
        height: u32,
        allow_enlarge: bool,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        nonzero("height", height)?;
        let dims = geometry::resize_to_height(self.dimensions(), height, allow_enlarge);
        self.apply_resize("resize_to_height", dims)
    }

    /// Scale so the shorter side lands on `target`.
    pub fn resize_to_short_side(
        &mut self,
        target: u32,
        allow_enlarge: bool,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        nonzero("target", target)?;
        let dims = geometry::resize_to_short_side(self.dimensions(), target, allow_enlarge);
        self.apply_resize("resize_to_short_side", dims)
    }

    /// Scale so the longer side lands on `target`.
    pub fn resize_to_long_side(
        &mut self,
        target: u32,
        allow_enlarge: bool,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        nonzero("target", target)?;
        let dims = geometry::resize_to_long_side(self.dimensions(), target, allow_enlarge);
        self.apply_resize("resize_to_long_side", dims)
    }

    /// Scale to fit entirely inside the box, aspect ratio preserved.
    pub fn resize_to_best_fit(
        &mut self,
        max_width: u32,
        max_height: u32,
        allow_enlarge: bool,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        nonzero("max_width", max_width)?;
        nonzero("max_height", max_height)?;
        let dims =
            geometry::resize_to_best_fit(self.dimensions(), max_width, max_height, allow_enlarge);
        self.apply_resize("resize_to_best_fit", dims)
    }

    /// Scale to cover the box entirely, aspect ratio preserved.
    pub fn resize_to_worst_fit(
        &mut self,
        max_width: u32,
        max_height: u32,
        allow_enlarge: bool,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        nonzero("max_width", max_width)?;
        nonzero("max_height", max_height)?;
        let dims =
            geometry::resize_to_worst_fit(self.dimensions(), max_width, max_height, allow_enlarge);
        self.apply_resize("resize_to_worst_fit", dims)
    }

    fn apply_resize(
        &mut self,
        op: &'static str,
        dims: (u32, u32),
    ) -> Result<&mut Self, ImageError> {
        if dims == self.dimensions() {
            debug!(op, "no-op");
            return Ok(self);
        }
        self.backend
            .resize(dims.0, dims.1)
            .map_err(|e| ImageError::from_backend(op, e))?;
        self.refresh(op)
    }

    /// Crop a window at an explicit origin. Without `allow_enlarge` the
    /// window clamps to the source edges; with it, overhang is filled with
    /// the background color.
    pub fn crop(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        allow_enlarge: bool,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        nonzero("width", width)?;
        nonzero("height", height)?;
        if x >= self.width || y >= self.height {
            return Err(ImageError::InvalidInput(format!(
                "crop origin ({x}, {y}) outside {}x{} image",
                self.width, self.height
            )));
        }
        let (w, h) = if allow_enlarge {
            (width, height)
        } else {
            (width.min(self.width - x), height.min(self.height - y))
        };
        let bg = self.background_or_default();
        self.backend
            .crop(i64::from(x), i64::from(y), w, h, bg)
            .map_err(|e| ImageError::from_backend("crop", e))?;
        self.refresh("crop")
    }

    /// Crop a window anchored at one of nine positions. The window clamps
    /// to the source; once it covers the whole image this is a no-op.
    pub fn crop_auto(
        &mut self,
        width: u32,
        height: u32,
        anchor: CropAnchor,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        nonzero("width", width)?;
        nonzero("height", height)?;
        let w = width.min(self.width);
        let h = height.min(self.height);
        if (w, h) == self.dimensions() {
            debug!(op = "crop_auto", "no-op");
            return Ok(self);
        }
        let (x, y) = crop::anchor_origin(w, h, self.width, self.height, anchor);
        let bg = self.background_or_default();
        self.backend
            .crop(i64::from(x), i64::from(y), w, h, bg)
            .map_err(|e| ImageError::from_backend("crop_auto", e))?;
        self.refresh("crop_auto")
    }

    /// Produce an exact `width` x `height` thumbnail: scale along the axis
    /// picked by `fill`, then center-crop to the box. In fit mode the
    /// off-axis overhang is background fill; in fill mode the overflow is
    /// cropped away. Without `allow_enlarge` the box clamps to the source.
    pub fn thumbnail(
        &mut self,
        width: u32,
        height: u32,
        fill: bool,
        allow_enlarge: bool,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        nonzero("width", width)?;
        nonzero("height", height)?;
        let (tw, th) = if allow_enlarge {
            (width, height)
        } else {
            (width.min(self.width), height.min(self.height))
        };
        let src_ratio = f64::from(self.width) / f64::from(self.height);
        let target_ratio = f64::from(tw) / f64::from(th);
        // Scale with enlargement enabled: the box is already clamped, and
        // fill mode may legitimately scale one axis past the other.
        let scaled = match crop::scale_axis(src_ratio, target_ratio, fill) {
            ScaleAxis::ToWidth => geometry::resize_to_width(self.dimensions(), tw, true),
            ScaleAxis::ToHeight => geometry::resize_to_height(self.dimensions(), th, true),
        };
        if scaled != self.dimensions() {
            self.backend
                .resize(scaled.0, scaled.1)
                .map_err(|e| ImageError::from_backend("thumbnail", e))?;
        }
        let (x, y) = crop::centered_origin(scaled, (tw, th));
        let bg = self.canvas_background();
        self.backend
            .crop(x, y, tw, th, bg)
            .map_err(|e| ImageError::from_backend("thumbnail", e))?;
        self.refresh("thumbnail")
    }

    /// Rotate clockwise by `degrees`, strictly between -360 and 360. Zero
    /// is a no-op; anything at or past a full turn is rejected.
    pub fn rotate(
        &mut self,
        degrees: i32,
        color: Option<ColorInput>,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        // Range check without negation: abs() would overflow on i32::MIN.
        if !(-359..=359).contains(&degrees) {
            return Err(ImageError::InvalidInput(format!(
                "rotation angle {degrees} outside -359..=359"
            )));
        }
        if degrees == 0 {
            debug!(op = "rotate", "no-op");
            return Ok(self);
        }
        let bg = self.resolve_color(color.as_ref())?;
        self.backend
            .rotate(degrees, bg)
            .map_err(|e| ImageError::from_backend("rotate", e))?;
        self.refresh("rotate")
    }

    pub fn flip(&mut self, axis: FlipAxis) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        self.backend
            .flip(axis)
            .map_err(|e| ImageError::from_backend("flip", e))?;
        self.refresh("flip")
    }

    /// Set the background used by crops, rotations, and thumbnails.
    pub fn set_background_color(
        &mut self,
        color: impl Into<ColorInput>,
    ) -> Result<&mut Self, ImageError> {
        self.background = Some(color.into().normalize()?);
        Ok(self)
    }

    /// Flatten the image onto a solid backdrop.
    pub fn fill_background(
        &mut self,
        color: Option<ColorInput>,
    ) -> Result<&mut Self, ImageError> {
        self.ensure_loaded()?;
        let bg = self.resolve_color(color.as_ref())?;
        self.backend
            .fill_background(bg)
            .map_err(|e| ImageError::from_backend("fill_background", e))?;
        self.refresh("fill_background")
    }
}

// ---------------------------------------------------------------------------
// Output and lifecycle
// ---------------------------------------------------------------------------

impl Image {
    /// Encode and write to disk. The format comes from the explicit
    /// argument, then the destination extension, then the image's own
    /// format. With no path the image saves over its source.
    pub fn save(
        &self,
        path: Option<&Path>,
        quality: Option<u8>,
        format: Option<ImageFormat>,
    ) -> Result<(), ImageError> {
        self.ensure_loaded()?;
        let target = match path {
            Some(p) => p,
            None => self.source_path.as_deref().ok_or_else(|| {
                ImageError::InvalidInput(
                    "no destination: image was not loaded from a file".into(),
                )
            })?,
        };
        let format = match format {
            Some(f) => f,
            None => match target.extension().and_then(|e| e.to_str()) {
                Some(ext) => check_format(ext)?,
                None => self.own_format()?,
            },
        };
        let bytes = self.encode_as(format, quality)?;
        fs::write(target, bytes).map_err(|source| ImageError::WriteFailed {
            path: target.to_path_buf(),
            source,
        })?;
        debug!(path = %target.display(), ?format, "saved");
        Ok(())
    }

    /// Encode to bytes in the image's own format unless overridden.
    pub fn to_bytes(
        &self,
        quality: Option<u8>,
        format: Option<ImageFormat>,
    ) -> Result<Vec<u8>, ImageError> {
        self.ensure_loaded()?;
        let format = match format {
            Some(f) => f,
            None => self.own_format()?,
        };
        self.encode_as(format, quality)
    }

    pub fn to_base64(
        &self,
        quality: Option<u8>,
        format: Option<ImageFormat>,
    ) -> Result<String, ImageError> {
        Ok(BASE64.encode(self.to_bytes(quality, format)?))
    }

    /// Encode as a `data:<mime>;base64,<payload>` URI.
    pub fn to_data_uri(
        &self,
        quality: Option<u8>,
        format: Option<ImageFormat>,
    ) -> Result<String, ImageError> {
        self.ensure_loaded()?;
        let format = match format {
            Some(f) => f,
            None => self.own_format()?,
        };
        let payload = BASE64.encode(self.encode_as(format, quality)?);
        Ok(format!("data:{};base64,{payload}", format.mime_type()))
    }

    fn own_format(&self) -> Result<ImageFormat, ImageError> {
        self.format.ok_or(ImageError::NotLoaded)
    }

    fn encode_as(&self, format: ImageFormat, quality: Option<u8>) -> Result<Vec<u8>, ImageError> {
        self.backend
            .encode(format, self.config.effective_quality(quality))
            .map_err(|e| ImageError::from_backend("encode", e))
    }

    /// Discard all edits and reload from the source file.
    pub fn revert(&mut self) -> Result<&mut Self, ImageError> {
        let path = self
            .source_path
            .clone()
            .ok_or(ImageError::RevertWithoutSource)?;
        let bytes = fs::read(&path)
            .map_err(|e| ImageError::SourceUnreadable(format!("{}: {e}", path.display())))?;
        self.backend.dispose();
        self.load_bytes(&bytes)?;
        Ok(self)
    }

    /// Release the pixel buffer and reset to the empty state. The image can
    /// be dropped or inspected afterwards, but not transformed.
    pub fn destroy(&mut self) {
        self.backend.dispose();
        self.source_path = None;
        self.width = 0;
        self.height = 0;
        self.format = None;
        self.background = self.config.background;
        self.exif = None;
    }
}

fn nonzero(name: &'static str, value: u32) -> Result<(), ImageError> {
    if value == 0 {
        return Err(ImageError::InvalidInput(format!("{name} must be positive")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::{test_jpeg, test_png};

    fn gradient(w: u32, h: u32) -> Image {
        Image::from_bytes(&test_png(w, h)).unwrap()
    }

    // Gradient pixel values encode source coordinates, so decoding the
    // output lets tests observe which window an operation selected.
    fn pixel_at(img: &Image, x: u32, y: u32) -> [u8; 4] {
        let bytes = img.to_bytes(None, Some(ImageFormat::Png)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        decoded.get_pixel(x, y).0
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    #[test]
    fn from_bytes_reports_dimensions_and_format() {
        let img = gradient(64, 48);
        assert_eq!(img.dimensions(), (64, 48));
        assert_eq!(img.format(), Some(ImageFormat::Png));
        assert!(img.source_path().is_none());
        assert_eq!(img.display_orientation(), Some(DisplayOrientation::Landscape));
    }

    #[test]
    fn load_and_save_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.png");
        std::fs::write(&path, test_png(40, 30)).unwrap();

        let mut img = Image::load(&path).unwrap();
        assert_eq!(img.source_path(), Some(path.as_path()));
        img.resize(20, 15, false).unwrap();

        let out = dir.path().join("out.jpg");
        img.save(Some(out.as_path()), Some(90), None).unwrap();
        let saved = Image::load(&out).unwrap();
        // Destination extension decides the format.
        assert_eq!(saved.format(), Some(ImageFormat::Jpeg));
        assert_eq!(saved.dimensions(), (20, 15));
    }

    #[test]
    fn loading_a_missing_file_is_source_unreadable() {
        let err = Image::load("/nonexistent/image.png").unwrap_err();
        assert!(matches!(err, ImageError::SourceUnreadable(_)));
    }

    #[test]
    fn undecodable_bytes_are_rejected() {
        let err = Image::from_bytes(b"definitely not pixels").unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat(_)));
    }

    #[test]
    fn base64_and_data_uri_round_trip() {
        let img = gradient(12, 8);
        let uri = img.to_data_uri(None, None).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        let back = Image::from_data_uri(&uri).unwrap();
        assert_eq!(back.dimensions(), (12, 8));

        let b64 = img.to_base64(None, None).unwrap();
        let back = Image::from_base64(&b64).unwrap();
        assert_eq!(back.dimensions(), (12, 8));
    }

    #[test]
    fn data_uri_with_unsupported_mime_is_rejected() {
        let err = Image::from_data_uri("data:image/webp;base64,AAAA").unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat(_)));
        let err = Image::from_data_uri("nonsense").unwrap_err();
        assert!(matches!(err, ImageError::SourceUnreadable(_)));
    }

    #[test]
    fn create_makes_a_blank_png_canvas() {
        let img = Image::create(10, 10, Some(ColorInput::from("black"))).unwrap();
        assert_eq!(img.dimensions(), (10, 10));
        assert_eq!(img.format(), Some(ImageFormat::Png));
        assert_eq!(pixel_at(&img, 5, 5), [0, 0, 0, 255]);
        assert!(matches!(
            Image::create(0, 10, None),
            Err(ImageError::InvalidInput(_))
        ));
    }

    // ------------------------------------------------------------------
    // Resize family
    // ------------------------------------------------------------------

    #[test]
    fn resize_to_width_derives_the_height() {
        let mut img = gradient(800, 533);
        img.resize_to_width(300, false).unwrap();
        assert_eq!(img.dimensions(), (300, 200));
    }

    #[test]
    fn resize_refuses_zero_targets() {
        let mut img = gradient(10, 10);
        assert!(matches!(
            img.resize(0, 5, false),
            Err(ImageError::InvalidInput(_))
        ));
    }

    #[test]
    fn oversized_resize_without_enlarge_is_a_noop() {
        let mut img = gradient(100, 80);
        img.resize(200, 160, false).unwrap();
        assert_eq!(img.dimensions(), (100, 80));
    }

    #[test]
    fn chained_transforms() {
        let mut img = gradient(800, 533);
        img.resize_to_best_fit(400, 400, false)
            .unwrap()
            .crop_auto(300, 200, CropAnchor::Center)
            .unwrap();
        assert_eq!(img.dimensions(), (300, 200));
    }

    // ------------------------------------------------------------------
    // Crop
    // ------------------------------------------------------------------

    #[test]
    fn crop_selects_the_requested_window() {
        let mut img = gradient(100, 100);
        img.crop(30, 40, 20, 20, false).unwrap();
        assert_eq!(img.dimensions(), (20, 20));
        assert_eq!(pixel_at(&img, 0, 0), [30, 40, 128, 255]);
    }

    #[test]
    fn crop_clamps_to_the_source_without_enlarge() {
        let mut img = gradient(100, 100);
        img.crop(90, 90, 50, 50, false).unwrap();
        assert_eq!(img.dimensions(), (10, 10));
    }

    #[test]
    fn crop_with_enlarge_pads_with_the_background() {
        let mut img = gradient(50, 50);
        img.set_background_color("black").unwrap();
        img.crop(40, 0, 20, 50, true).unwrap();
        assert_eq!(img.dimensions(), (20, 50));
        // Past the right edge of the source: background.
        assert_eq!(pixel_at(&img, 15, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn crop_origin_outside_the_image_is_invalid() {
        let mut img = gradient(50, 50);
        assert!(matches!(
            img.crop(50, 0, 10, 10, false),
            Err(ImageError::InvalidInput(_))
        ));
    }

    #[test]
    fn crop_auto_anchors_resolve_to_the_expected_origins() {
        let mut img = gradient(800, 533);
        img.crop_auto(400, 400, CropAnchor::TopLeft).unwrap();
        assert_eq!(img.dimensions(), (400, 400));
        assert_eq!(pixel_at(&img, 0, 0), [0, 0, 128, 255]);

        let mut img = gradient(800, 533);
        img.crop_auto(400, 400, CropAnchor::Center).unwrap();
        // Centered origin is (200, 67).
        assert_eq!(pixel_at(&img, 0, 0), [200, 67, 128, 255]);
    }

    #[test]
    fn crop_auto_covering_the_source_is_a_noop() {
        let mut img = gradient(100, 80);
        img.crop_auto(200, 200, CropAnchor::Center).unwrap();
        assert_eq!(img.dimensions(), (100, 80));
    }

    // ------------------------------------------------------------------
    // Thumbnail
    // ------------------------------------------------------------------

    #[test]
    fn thumbnail_always_lands_on_the_exact_box() {
        // Landscape and portrait sources, fill and fit, with and without
        // enlargement: the box is exact in all eight combinations.
        for (sw, sh) in [(800, 533), (533, 800)] {
            for fill in [false, true] {
                for enlarge in [false, true] {
                    let mut img = gradient(sw, sh);
                    img.thumbnail(300, 150, fill, enlarge).unwrap();
                    assert_eq!(
                        img.dimensions(),
                        (300, 150),
                        "{sw}x{sh} fill={fill} enlarge={enlarge}"
                    );
                }
            }
        }
    }

    #[test]
    fn fit_thumbnail_pads_the_short_axis() {
        let mut img = gradient(800, 533);
        img.thumbnail(300, 150, false, false).unwrap();
        // Scaled to 225x150 and centered: 37 columns of padding on the
        // left, transparent because the source is PNG.
        assert_eq!(pixel_at(&img, 0, 0)[3], 0);
        assert_ne!(pixel_at(&img, 150, 75)[3], 0);
    }

    #[test]
    fn fill_thumbnail_crops_instead_of_padding() {
        let mut img = gradient(800, 533);
        img.thumbnail(300, 150, true, false).unwrap();
        // Scaled to 300x200 and center-cropped; every pixel is image.
        assert_eq!(pixel_at(&img, 0, 0)[3], 255);
        assert_eq!(pixel_at(&img, 299, 149)[3], 255);
    }

    #[test]
    fn thumbnail_box_clamps_to_the_source_without_enlarge() {
        let mut img = gradient(100, 80);
        img.thumbnail(300, 150, false, false).unwrap();
        assert_eq!(img.dimensions(), (100, 80));
        let mut img = gradient(100, 80);
        img.thumbnail(300, 150, false, true).unwrap();
        assert_eq!(img.dimensions(), (300, 150));
    }

    // ------------------------------------------------------------------
    // Rotate and flip
    // ------------------------------------------------------------------

    #[test]
    fn rotate_validates_the_angle() {
        let mut img = gradient(10, 10);
        assert!(matches!(
            img.rotate(360, None),
            Err(ImageError::InvalidInput(_))
        ));
        assert!(matches!(
            img.rotate(-400, None),
            Err(ImageError::InvalidInput(_))
        ));
        // Extreme magnitudes must be rejected cleanly, not wrap or panic.
        assert!(matches!(
            img.rotate(i32::MIN, None),
            Err(ImageError::InvalidInput(_))
        ));
        assert!(matches!(
            img.rotate(i32::MAX, None),
            Err(ImageError::InvalidInput(_))
        ));
        img.rotate(0, None).unwrap();
        assert_eq!(img.dimensions(), (10, 10));
    }

    #[test]
    fn quarter_rotations_swap_dimensions() {
        let mut img = gradient(64, 48);
        img.rotate(90, None).unwrap();
        assert_eq!(img.dimensions(), (48, 64));
        img.rotate(-90, None).unwrap();
        assert_eq!(img.dimensions(), (64, 48));
    }

    #[test]
    fn arbitrary_rotation_expands_and_fills_corners() {
        let mut img = gradient(100, 100);
        img.rotate(45, Some(ColorInput::from("black"))).unwrap();
        assert_eq!(img.dimensions(), (141, 141));
        assert_eq!(pixel_at(&img, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn flip_mirrors_without_changing_dimensions() {
        let mut img = gradient(64, 48);
        img.flip(FlipAxis::Horizontal).unwrap();
        assert_eq!(img.dimensions(), (64, 48));
        assert_eq!(pixel_at(&img, 63, 0), [0, 0, 128, 255]);
    }

    // ------------------------------------------------------------------
    // Orientation
    // ------------------------------------------------------------------

    #[test]
    fn orientation_code_six_swaps_dimensions_once() {
        let mut img = gradient(64, 48);
        img.exif = Some(Some(crate::metadata::ExifData::from_pairs(&[(
            "Orientation",
            "6",
        )])));
        img.apply_orientation().unwrap();
        assert_eq!(img.dimensions(), (48, 64));
        // The cached tag is upright now, so a second pass is a no-op.
        assert_eq!(img.exif().unwrap().orientation(), Some(1));
        img.apply_orientation().unwrap();
        assert_eq!(img.dimensions(), (48, 64));
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    #[test]
    fn revert_restores_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        std::fs::write(&path, test_png(40, 30)).unwrap();

        let mut img = Image::load(&path).unwrap();
        img.resize(10, 10, false).unwrap();
        assert_eq!(img.dimensions(), (10, 10));
        img.revert().unwrap();
        assert_eq!(img.dimensions(), (40, 30));
    }

    #[test]
    fn revert_without_a_source_path_fails() {
        let mut img = gradient(10, 10);
        assert!(matches!(
            img.revert(),
            Err(ImageError::RevertWithoutSource)
        ));
    }

    #[test]
    fn destroy_empties_the_image() {
        let mut img = gradient(10, 10);
        img.destroy();
        assert!(!img.is_loaded());
        assert_eq!(img.display_orientation(), None);
        assert!(matches!(img.resize(5, 5, false), Err(ImageError::NotLoaded)));
        assert!(matches!(
            img.to_bytes(None, None),
            Err(ImageError::NotLoaded)
        ));
    }

    #[test]
    fn both_engines_agree_on_geometry() {
        for engine in [Engine::Raster, Engine::Command] {
            let mut img =
                Image::from_bytes_with(&test_jpeg(800, 533), ImageConfig::with_engine(engine))
                    .unwrap();
            img.thumbnail(300, 150, true, false).unwrap();
            assert_eq!(img.dimensions(), (300, 150), "{engine:?}");
        }
    }

    #[test]
    fn info_snapshot() {
        let img = gradient(100, 50);
        let info = img.info();
        assert_eq!(info.width, 100);
        assert_eq!(info.mime_type.as_deref(), Some("image/png"));
        assert_eq!(info.extension.as_deref(), Some("png"));
        assert_eq!(info.orientation, Some(DisplayOrientation::Landscape));
    }
}
