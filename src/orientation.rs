//! EXIF orientation codes and the transform steps that undo them.
//!
//! Cameras record a sensor orientation tag (codes 1 through 8) instead of
//! rotating pixels. [`steps`] maps a code to the pixel operations that bring
//! the image upright; code 1 and anything out of range map to no steps.
//! Rotations are clockwise.

/// One pixel operation in an orientation correction sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FlipHorizontal,
    Rotate90,
    Rotate180,
    Rotate270,
}

/// Correction steps for an EXIF orientation code, applied in order.
pub fn steps(code: u32) -> &'static [Step] {
    match code {
        2 => &[Step::FlipHorizontal],
        3 => &[Step::Rotate180],
        4 => &[Step::Rotate180, Step::FlipHorizontal],
        5 => &[Step::Rotate90, Step::FlipHorizontal],
        6 => &[Step::Rotate90],
        7 => &[Step::Rotate270, Step::FlipHorizontal],
        8 => &[Step::Rotate270],
        _ => &[],
    }
}

/// Whether a code's correction swaps width and height.
pub fn swaps_dimensions(code: u32) -> bool {
    matches!(code, 5..=8)
}
