//! Pure geometry calculations for the resize family.
//!
//! Every function here maps a source dimension pair plus targets to an output
//! dimension pair, with no pixel work and no backend involvement, so the
//! arithmetic is testable by itself and both backends inherit identical
//! geometry. Derived dimensions round half away from zero.
//!
//! Enlargement policy: with `allow_enlarge` false, a plain [`resize`] whose
//! targets both exceed the source is a no-op, and a single oversized axis is
//! clamped to the source on that axis alone. The fit variants instead shrink
//! the bounding box before delegating, which preserves aspect ratio.

/// Round a derived dimension, half away from zero, floored at zero.
pub(crate) fn round_dim(v: f64) -> u32 {
    let r = v.round();
    if r <= 0.0 { 0 } else { r as u32 }
}

/// Resize to an explicit target box. Aspect ratio is not preserved.
pub fn resize(src: (u32, u32), width: u32, height: u32, allow_enlarge: bool) -> (u32, u32) {
    let (sw, sh) = src;
    if sw == 0 || sh == 0 {
        return src;
    }
    if allow_enlarge {
        return (width, height);
    }
    if width > sw && height > sh {
        // Both targets exceed the source: leave it untouched.
        return src;
    }
    (width.min(sw), height.min(sh))
}

/// Resize to a target width, height following proportionally.
pub fn resize_to_width(src: (u32, u32), width: u32, allow_enlarge: bool) -> (u32, u32) {
    let (sw, sh) = src;
    if sw == 0 || sh == 0 {
        return src;
    }
    let height = round_dim(f64::from(sh) * f64::from(width) / f64::from(sw));
    resize(src, width, height, allow_enlarge)
}

/// Resize to a target height, width following proportionally.
pub fn resize_to_height(src: (u32, u32), height: u32, allow_enlarge: bool) -> (u32, u32) {
    let (sw, sh) = src;
    if sw == 0 || sh == 0 {
        return src;
    }
    let width = round_dim(f64::from(sw) * f64::from(height) / f64::from(sh));
    resize(src, width, height, allow_enlarge)
}

/// Scale so the shorter side lands on `target`. Square sources take the
/// height branch.
pub fn resize_to_short_side(src: (u32, u32), target: u32, allow_enlarge: bool) -> (u32, u32) {
    let (sw, sh) = src;
    if sw < sh {
        resize_to_width(src, target, allow_enlarge)
    } else {
        resize_to_height(src, target, allow_enlarge)
    }
}

/// Scale so the longer side lands on `target`. Square sources take the
/// height branch.
pub fn resize_to_long_side(src: (u32, u32), target: u32, allow_enlarge: bool) -> (u32, u32) {
    let (sw, sh) = src;
    if sw > sh {
        resize_to_width(src, target, allow_enlarge)
    } else {
        resize_to_height(src, target, allow_enlarge)
    }
}

/// Scale to fit entirely inside the box, aspect ratio preserved.
pub fn resize_to_best_fit(
    src: (u32, u32),
    max_width: u32,
    max_height: u32,
    allow_enlarge: bool,
) -> (u32, u32) {
    let (sw, sh) = src;
    if sw == 0 || sh == 0 || max_width == 0 || max_height == 0 {
        return src;
    }
    let (bw, bh) = if allow_enlarge {
        (max_width, max_height)
    } else {
        (max_width.min(sw), max_height.min(sh))
    };
    if f64::from(sh) / f64::from(sw) < f64::from(bh) / f64::from(bw) {
        resize_to_width(src, bw, allow_enlarge)
    } else {
        resize_to_height(src, bh, allow_enlarge)
    }
}

/// Scale to cover the box entirely, aspect ratio preserved. At least one
/// output side meets its box side exactly and the other meets or exceeds it.
pub fn resize_to_worst_fit(
    src: (u32, u32),
    max_width: u32,
    max_height: u32,
    allow_enlarge: bool,
) -> (u32, u32) {
    let (sw, sh) = src;
    if sw == 0 || sh == 0 || max_width == 0 || max_height == 0 {
        return src;
    }
    let (bw, bh) = if allow_enlarge {
        (max_width, max_height)
    } else {
        (max_width.min(sw), max_height.min(sh))
    };
    if f64::from(sh) / f64::from(sw) > f64::from(bh) / f64::from(bw) {
        resize_to_width(src, bw, allow_enlarge)
    } else {
        resize_to_height(src, bh, allow_enlarge)
    }
}

/// Canvas size after rotating a `w` x `h` image by `degrees` clockwise.
///
/// Right angles are exact dimension swaps; other angles use the rotated
/// bounding box of the corners.
pub fn rotated_bounds(w: u32, h: u32, degrees: i32) -> (u32, u32) {
    match degrees.rem_euclid(360) {
        0 | 180 => (w, h),
        90 | 270 => (h, w),
        deg => {
            let rad = f64::from(deg).to_radians();
            let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
            let (fw, fh) = (f64::from(w), f64::from(h));
            (round_dim(fw * cos + fh * sin), round_dim(fw * sin + fh * cos))
        }
    }
}
