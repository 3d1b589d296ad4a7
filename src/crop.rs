//! Crop anchor resolution and the thumbnail scaling-axis choice.
//!
//! [`anchor_origin`] turns one of nine anchor positions into a top-left crop
//! origin inside the source. Centered axes round half away from zero and any
//! negative intermediate clamps to zero, so the returned origin is always
//! inside the source even when the window is larger than the image on an
//! axis.

use serde::{Deserialize, Serialize};

/// Where a crop window sits inside the source image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropAnchor {
    #[default]
    Center,
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Top-left origin of a `width` x `height` window anchored inside a source.
pub fn anchor_origin(
    width: u32,
    height: u32,
    src_width: u32,
    src_height: u32,
    anchor: CropAnchor,
) -> (u32, u32) {
    let centered = |window: u32, src: u32| -> u32 {
        let half = (f64::from(src) - f64::from(window)) / 2.0;
        round_clamped(half)
    };
    let pinned = |window: u32, src: u32| -> u32 { src.saturating_sub(window) };

    let x = match anchor {
        CropAnchor::Left | CropAnchor::TopLeft | CropAnchor::BottomLeft => 0,
        CropAnchor::Right | CropAnchor::TopRight | CropAnchor::BottomRight => {
            pinned(width, src_width)
        }
        CropAnchor::Center | CropAnchor::Top | CropAnchor::Bottom => centered(width, src_width),
    };
    let y = match anchor {
        CropAnchor::Top | CropAnchor::TopLeft | CropAnchor::TopRight => 0,
        CropAnchor::Bottom | CropAnchor::BottomLeft | CropAnchor::BottomRight => {
            pinned(height, src_height)
        }
        CropAnchor::Center | CropAnchor::Left | CropAnchor::Right => centered(height, src_height),
    };
    (x, y)
}

fn round_clamped(v: f64) -> u32 {
    let r = v.round();
    if r <= 0.0 { 0 } else { r as u32 }
}

/// Which axis a thumbnail scales along before its center crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAxis {
    ToWidth,
    ToHeight,
}

/// Pick the scaling axis from the source and target aspect ratios.
///
/// Fill mode scales the axis that makes the image cover the target box; fit
/// mode inverts the choice so the image lands inside it.
pub fn scale_axis(src_ratio: f64, target_ratio: f64, fill: bool) -> ScaleAxis {
    let to_width = src_ratio >= target_ratio;
    match (fill, to_width) {
        (false, true) | (true, false) => ScaleAxis::ToWidth,
        (false, false) | (true, true) => ScaleAxis::ToHeight,
    }
}

/// Signed origin that centers a scaled image inside a target window.
/// Negative components mean the window extends past the image on that side
/// and the overhang gets background fill.
pub(crate) fn centered_origin(scaled: (u32, u32), target: (u32, u32)) -> (i64, i64) {
    let center = |s: u32, t: u32| -> i64 {
        ((f64::from(s) - f64::from(t)) / 2.0).round() as i64
    };
    (center(scaled.0, target.0), center(scaled.1, target.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: (u32, u32) = (800, 533);

    #[test]
    fn all_nine_anchors_resolve() {
        let origin = |a| anchor_origin(400, 400, SRC.0, SRC.1, a);
        assert_eq!(origin(CropAnchor::TopLeft), (0, 0));
        assert_eq!(origin(CropAnchor::Top), (200, 0));
        assert_eq!(origin(CropAnchor::TopRight), (400, 0));
        assert_eq!(origin(CropAnchor::Left), (0, 67));
        assert_eq!(origin(CropAnchor::Center), (200, 67));
        assert_eq!(origin(CropAnchor::Right), (400, 67));
        assert_eq!(origin(CropAnchor::BottomLeft), (0, 133));
        assert_eq!(origin(CropAnchor::Bottom), (200, 133));
        assert_eq!(origin(CropAnchor::BottomRight), (400, 133));
    }

    #[test]
    fn default_anchor_is_center() {
        assert_eq!(CropAnchor::default(), CropAnchor::Center);
    }

    #[test]
    fn oversized_windows_clamp_to_zero() {
        // Window taller than the source: the centered y would be negative.
        assert_eq!(anchor_origin(400, 600, SRC.0, SRC.1, CropAnchor::Center), (200, 0));
        assert_eq!(
            anchor_origin(900, 600, SRC.0, SRC.1, CropAnchor::BottomRight),
            (0, 0)
        );
    }

    #[test]
    fn fill_and_fit_invert_the_axis_choice() {
        // Source wider than the target box.
        let src_ratio = 800.0 / 533.0;
        assert_eq!(scale_axis(src_ratio, 2.0, false), ScaleAxis::ToHeight);
        assert_eq!(scale_axis(src_ratio, 2.0, true), ScaleAxis::ToWidth);
        assert_eq!(scale_axis(src_ratio, 1.0, false), ScaleAxis::ToWidth);
        assert_eq!(scale_axis(src_ratio, 1.0, true), ScaleAxis::ToHeight);
    }

    #[test]
    fn centered_origin_goes_negative_when_the_target_is_larger() {
        assert_eq!(centered_origin((225, 150), (300, 150)), (-38, 0));
        assert_eq!(centered_origin((450, 300), (300, 150)), (75, 75));
    }
}
