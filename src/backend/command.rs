//! Format-aware engine.
//!
//! Holds a `DynamicImage` and keeps the decoded color layout (grayscale,
//! RGB, RGBA) intact for as long as possible: crops that stay inside the
//! source and right-angle rotations never touch the channel layout. Only
//! operations that introduce background converge on RGBA. Geometry is shared
//! with the raster engine, so both report identical dimensions for the same
//! operation sequence.

use super::raster::{crop_onto, encode_rgba, pixel, rotate_any};
use super::{sniff, BackendError, Dimensions, FlipAxis, PixelBackend, SourceInfo};
use crate::color::Rgba;
use crate::format::ImageFormat;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

pub struct CommandBackend {
    handle: Option<DynamicImage>,
}

impl CommandBackend {
    pub fn new() -> Self {
        Self { handle: None }
    }

    fn handle(&self) -> Result<&DynamicImage, BackendError> {
        self.handle.as_ref().ok_or(BackendError::Disposed)
    }
}

impl Default for CommandBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelBackend for CommandBackend {
    fn probe_bytes(&self, bytes: &[u8]) -> Result<SourceInfo, BackendError> {
        sniff(bytes)
    }

    fn decode(&mut self, bytes: &[u8]) -> Result<(), BackendError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        self.handle = Some(img);
        Ok(())
    }

    fn create(&mut self, width: u32, height: u32, color: Rgba) -> Result<(), BackendError> {
        let canvas = RgbaImage::from_pixel(width, height, pixel(color));
        self.handle = Some(DynamicImage::ImageRgba8(canvas));
        Ok(())
    }

    fn probe(&self) -> Option<Dimensions> {
        self.handle
            .as_ref()
            .map(|img| Dimensions { width: img.width(), height: img.height() })
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        let img = self.handle()?;
        self.handle = Some(img.resize_exact(width, height, FilterType::Lanczos3));
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
        let img = self.handle()?;
        let inside = x >= 0
            && y >= 0
            && x + i64::from(width) <= i64::from(img.width())
            && y + i64::from(height) <= i64::from(img.height());
        self.handle = Some(if inside {
            // Fully interior window: keep the color layout.
            img.crop_imm(x as u32, y as u32, width, height)
        } else {
            let padded = crop_onto(&img.to_rgba8(), x, y, width, height, background);
            DynamicImage::ImageRgba8(padded)
        });
        Ok(())
    }

    fn rotate(&mut self, degrees: i32, background: Rgba) -> Result<(), BackendError> {
        let img = self.handle()?;
        let rotated = match degrees.rem_euclid(360) {
            0 => return Ok(()),
            90 => img.rotate90(),
            180 => img.rotate180(),
            270 => img.rotate270(),
            deg => DynamicImage::ImageRgba8(rotate_any(&img.to_rgba8(), deg, background)),
        };
        self.handle = Some(rotated);
        Ok(())
    }

    fn flip(&mut self, axis: FlipAxis) -> Result<(), BackendError> {
        let img = self.handle()?;
        self.handle = Some(match axis {
            FlipAxis::Horizontal => img.fliph(),
            FlipAxis::Vertical => img.flipv(),
            FlipAxis::Both => img.rotate180(),
        });
        Ok(())
    }

    fn fill_background(&mut self, color: Rgba) -> Result<(), BackendError> {
        let img = self.handle()?;
        let src = img.to_rgba8();
        let mut canvas = RgbaImage::from_pixel(src.width(), src.height(), pixel(color));
        imageops::overlay(&mut canvas, &src, 0, 0);
        self.handle = Some(DynamicImage::ImageRgba8(canvas));
        Ok(())
    }

    fn encode(&self, format: ImageFormat, quality: u8) -> Result<Vec<u8>, BackendError> {
        encode_rgba(&self.handle()?.to_rgba8(), format, quality)
    }

    fn dispose(&mut self) {
        self.handle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::{test_jpeg, test_png};

    fn loaded(w: u32, h: u32) -> CommandBackend {
        let mut backend = CommandBackend::new();
        backend.decode(&test_png(w, h)).unwrap();
        backend
    }

    #[test]
    fn decode_keeps_the_source_color_layout() {
        let mut backend = CommandBackend::new();
        backend.decode(&test_jpeg(16, 16)).unwrap();
        // JPEG decodes without an alpha channel.
        assert!(matches!(backend.handle().unwrap(), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn interior_crop_preserves_the_layout() {
        let mut backend = CommandBackend::new();
        backend.decode(&test_jpeg(32, 32)).unwrap();
        backend.crop(4, 4, 8, 8, Rgba::WHITE).unwrap();
        assert!(matches!(backend.handle().unwrap(), DynamicImage::ImageRgb8(_)));
        let d = backend.probe().unwrap();
        assert_eq!((d.width, d.height), (8, 8));
    }

    #[test]
    fn overhanging_crop_converges_on_rgba() {
        let mut backend = CommandBackend::new();
        backend.decode(&test_jpeg(32, 32)).unwrap();
        backend.crop(-8, 0, 48, 32, Rgba::WHITE).unwrap();
        assert!(matches!(backend.handle().unwrap(), DynamicImage::ImageRgba8(_)));
        let d = backend.probe().unwrap();
        assert_eq!((d.width, d.height), (48, 32));
    }

    #[test]
    fn rotation_matches_the_shared_geometry() {
        let mut backend = loaded(100, 50);
        backend.rotate(90, Rgba::WHITE).unwrap();
        let d = backend.probe().unwrap();
        assert_eq!((d.width, d.height), (50, 100));
        backend.rotate(45, Rgba::WHITE).unwrap();
        let d = backend.probe().unwrap();
        assert_eq!(
            (d.width, d.height),
            crate::geometry::rotated_bounds(50, 100, 45)
        );
    }

    #[test]
    fn operations_fail_after_dispose() {
        let mut backend = loaded(8, 8);
        backend.dispose();
        assert!(matches!(
            backend.encode(ImageFormat::Png, 90),
            Err(BackendError::Disposed)
        ));
    }
}
