//! # Easel
//!
//! A backend-agnostic image editing facade: load an image from a file, raw
//! bytes, base64, or a data URI; query its metadata; apply geometric and
//! color transforms; and re-encode the result. The public surface is one
//! type, [`Image`], and every edit follows the same pipeline:
//!
//! ```text
//! validate arguments → compute geometry (pure) → backend call → re-probe
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`image`] | The [`Image`] facade — construction, transforms, output, lifecycle |
//! | [`geometry`] | Pure resize arithmetic: explicit, proportional, side- and fit-based |
//! | [`crop`] | Nine-anchor crop origins and the thumbnail scaling-axis choice |
//! | [`color`] | Color inputs (hex, tuples, names) normalized to canonical RGBA |
//! | [`orientation`] | EXIF orientation codes mapped to correction steps |
//! | [`metadata`] | EXIF tag extraction, friendly aliases, GPS decoding |
//! | [`format`] | The JPEG/PNG/GIF format set and MIME/extension mappings |
//! | [`backend`] | The [`PixelBackend`] trait and its two engines |
//! | [`config`] | Per-image configuration: engine, quality, auto-orientation |
//! | [`error`] | [`ImageError`] — every failure the facade can report |
//!
//! # Design Decisions
//!
//! ## Geometry Outside the Backends
//!
//! All dimension arithmetic lives in [`geometry`] and [`crop`] as pure
//! functions over `(width, height)` pairs. Backends only ever receive final
//! pixel coordinates, so both engines produce identical dimensions for the
//! same operation sequence and the arithmetic is testable without decoding
//! a single image.
//!
//! ## Signed Crop Origins
//!
//! The backend crop primitive takes a signed origin. A negative component
//! means the requested window overhangs the source, and the overhang is
//! filled with the background color. Thumbnails are built entirely on this:
//! scale along one axis, then center-crop to the exact target box — fit
//! mode pads, fill mode crops, same code path.
//!
//! ## Two Engines, One Trait
//!
//! The raster engine keeps a flat RGBA buffer and applies operations
//! eagerly; the command engine keeps a format-aware handle and preserves
//! the decoded color layout until encode time. Both implement
//! [`PixelBackend`], chosen once at construction via
//! [`ImageConfig::engine`], and neither leaks into the public API.
//!
//! ## EXIF Is Read Once
//!
//! Orientation correction happens at load, while the source bytes are at
//! hand. After the pixels are upright the cached orientation tag is reset,
//! so querying it never double-reports a rotation the buffer no longer
//! needs. Other tags are parsed from the same read and served from memory.

pub mod backend;
pub mod color;
pub mod config;
pub mod crop;
pub mod error;
pub mod format;
pub mod geometry;
pub mod image;
pub mod metadata;
pub mod orientation;

pub use crate::backend::{BackendError, Dimensions, FlipAxis, PixelBackend};
pub use crate::color::{ColorInput, NamedColor, Rgba};
pub use crate::config::{Engine, ImageConfig};
pub use crate::crop::CropAnchor;
pub use crate::error::ImageError;
pub use crate::format::ImageFormat;
pub use crate::image::{DisplayOrientation, Image, ImageInfo};
pub use crate::metadata::{ExifData, GpsPosition, GpsValue};
