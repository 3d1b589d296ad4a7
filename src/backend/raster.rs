//! Eager in-memory engine.
//!
//! Holds a plain RGBA buffer and applies every operation immediately through
//! `image::imageops` (plus `imageproc` for non-right-angle rotation). Alpha
//! is resolved at encode time per format: JPEG flattens onto opaque white,
//! PNG keeps the channel, GIF thresholds it to on/off.

use super::{sniff, BackendError, Dimensions, FlipAxis, PixelBackend, SourceInfo};
use crate::color::Rgba;
use crate::format::ImageFormat;
use crate::geometry;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};

pub struct RasterBackend {
    buffer: Option<RgbaImage>,
}

impl RasterBackend {
    pub fn new() -> Self {
        Self { buffer: None }
    }

    fn buf(&self) -> Result<&RgbaImage, BackendError> {
        self.buffer.as_ref().ok_or(BackendError::Disposed)
    }
}

impl Default for RasterBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Pack a normalized color into an RGBA pixel.
pub(super) fn pixel(color: Rgba) -> image::Rgba<u8> {
    let a = (f64::from(color.a.clamp(0.0, 1.0)) * 255.0).round() as u8;
    image::Rgba([color.r, color.g, color.b, a])
}

/// Place `src` at the signed offset `(x, y)` of a fresh background canvas.
pub(super) fn crop_onto(
    src: &RgbaImage,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    background: Rgba,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, pixel(background));
    imageops::replace(&mut canvas, src, -x, -y);
    canvas
}

/// Rotate by an arbitrary angle: expand the canvas to the rotated bounds
/// first so no corner is clipped, then rotate about the center.
pub(super) fn rotate_any(src: &RgbaImage, degrees: i32, background: Rgba) -> RgbaImage {
    let (bw, bh) = geometry::rotated_bounds(src.width(), src.height(), degrees);
    let bg = pixel(background);
    let mut canvas = RgbaImage::from_pixel(bw, bh, bg);
    let dx = (i64::from(bw) - i64::from(src.width())) / 2;
    let dy = (i64::from(bh) - i64::from(src.height())) / 2;
    imageops::overlay(&mut canvas, src, dx, dy);
    imageproc::geometric_transformations::rotate_about_center(
        &canvas,
        (degrees as f32).to_radians(),
        imageproc::geometric_transformations::Interpolation::Bilinear,
        bg,
    )
}

/// Blend onto opaque white and drop the alpha channel, for JPEG output.
pub(super) fn flatten_white(src: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(src.width(), src.height(), |x, y| {
        let p = src.get_pixel(x, y);
        let a = f32::from(p[3]) / 255.0;
        let blend = |c: u8| (f32::from(c) * a + 255.0 * (1.0 - a)).round() as u8;
        image::Rgb([blend(p[0]), blend(p[1]), blend(p[2])])
    })
}

/// Snap alpha to fully opaque or fully transparent, for GIF output.
pub(super) fn threshold_alpha(src: &RgbaImage) -> RgbaImage {
    let mut out = src.clone();
    for p in out.pixels_mut() {
        p[3] = if p[3] < 128 { 0 } else { 255 };
    }
    out
}

/// Encode an RGBA buffer in any of the supported formats.
pub(super) fn encode_rgba(
    src: &RgbaImage,
    format: ImageFormat,
    quality: u8,
) -> Result<Vec<u8>, BackendError> {
    let mut out = Vec::new();
    let err = |e: image::ImageError| BackendError::Encode(e.to_string());
    match format {
        ImageFormat::Jpeg => {
            let rgb = flatten_white(src);
            JpegEncoder::new_with_quality(&mut out, quality)
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                .map_err(err)?;
        }
        ImageFormat::Png => {
            PngEncoder::new(&mut out)
                .write_image(src.as_raw(), src.width(), src.height(), ExtendedColorType::Rgba8)
                .map_err(err)?;
        }
        ImageFormat::Gif => {
            let snapped = threshold_alpha(src);
            let (w, h) = (snapped.width(), snapped.height());
            GifEncoder::new(&mut out)
                .encode(snapped.as_raw(), w, h, ExtendedColorType::Rgba8)
                .map_err(err)?;
        }
    }
    Ok(out)
}

impl PixelBackend for RasterBackend {
    fn probe_bytes(&self, bytes: &[u8]) -> Result<SourceInfo, BackendError> {
        sniff(bytes)
    }

    fn decode(&mut self, bytes: &[u8]) -> Result<(), BackendError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        self.buffer = Some(img.to_rgba8());
        Ok(())
    }

    fn create(&mut self, width: u32, height: u32, color: Rgba) -> Result<(), BackendError> {
        self.buffer = Some(RgbaImage::from_pixel(width, height, pixel(color)));
        Ok(())
    }

    fn probe(&self) -> Option<Dimensions> {
        self.buffer
            .as_ref()
            .map(|b| Dimensions { width: b.width(), height: b.height() })
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        let buf = self.buf()?;
        self.buffer = Some(imageops::resize(buf, width, height, FilterType::Lanczos3));
        Ok(())
    }

    fn crop(
        &mut self,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        background: Rgba,
    ) -> Result<(), BackendError> {
        let buf = self.buf()?;
        self.buffer = Some(crop_onto(buf, x, y, width, height, background));
        Ok(())
    }

    fn rotate(&mut self, degrees: i32, background: Rgba) -> Result<(), BackendError> {
        let buf = self.buf()?;
        let rotated = match degrees.rem_euclid(360) {
            0 => return Ok(()),
            90 => imageops::rotate90(buf),
            180 => imageops::rotate180(buf),
            270 => imageops::rotate270(buf),
            deg => rotate_any(buf, deg, background),
        };
        self.buffer = Some(rotated);
        Ok(())
    }

    fn flip(&mut self, axis: FlipAxis) -> Result<(), BackendError> {
        let buf = self.buf()?;
        self.buffer = Some(match axis {
            FlipAxis::Horizontal => imageops::flip_horizontal(buf),
            FlipAxis::Vertical => imageops::flip_vertical(buf),
            FlipAxis::Both => imageops::rotate180(buf),
        });
        Ok(())
    }

    fn fill_background(&mut self, color: Rgba) -> Result<(), BackendError> {
        let buf = self.buf()?;
        let mut canvas = RgbaImage::from_pixel(buf.width(), buf.height(), pixel(color));
        imageops::overlay(&mut canvas, buf, 0, 0);
        self.buffer = Some(canvas);
        Ok(())
    }

    fn encode(&self, format: ImageFormat, quality: u8) -> Result<Vec<u8>, BackendError> {
        encode_rgba(self.buf()?, format, quality)
    }

    fn dispose(&mut self) {
        self.buffer = None;
    }
}
