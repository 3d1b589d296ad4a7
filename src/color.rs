//! Color inputs and the canonical RGBA representation.
//!
//! Every color accepted by the facade — hex strings, channel tuples, named
//! colors — is normalized into [`Rgba`] before it reaches a backend: channels
//! as `u8`, alpha as an `f32` fraction in `0.0..=1.0`. An absent color
//! normalizes to opaque white, the default backdrop for flattening.
//!
//! Alpha crosses the hex boundary through a percentage: a hex alpha byte maps
//! to a whole percentage (`0x7f` is 50%), and the fraction stored in [`Rgba`]
//! is that percentage over 100. Both directions round half away from zero, so
//! round trips stay within one hex step.

use crate::error::ImageError;
use serde::{Deserialize, Serialize};

/// Canonical normalized color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity fraction, `0.0` transparent through `1.0` opaque.
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba { r: 255, g: 255, b: 255, a: 1.0 };
    pub const BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 1.0 };
    /// Fully transparent, white RGB channels.
    pub const TRANSPARENT: Rgba = Rgba { r: 255, g: 255, b: 255, a: 0.0 };

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }

    /// Alpha as a hex byte, via the percentage mapping.
    pub fn alpha_byte(self) -> u8 {
        percentage_to_hex(self.a)
    }

    /// Lowercase hex form, `#rrggbb` or `#rrggbbaa`.
    pub fn to_hex(self, with_alpha: bool) -> String {
        if with_alpha {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.alpha_byte())
        } else {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Black,
    White,
    Transparent,
}

/// A color as callers supply it, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorInput {
    /// `#rgb`, `#rgba`, `#rrggbb`, or `#rrggbbaa`; the `#` is optional.
    Hex(String),
    /// Channel triple, fully opaque.
    Rgb(u8, u8, u8),
    /// Channel triple plus an alpha fraction, clamped to `0.0..=1.0`.
    Rgba(u8, u8, u8, f32),
    Named(NamedColor),
}

impl ColorInput {
    pub fn normalize(&self) -> Result<Rgba, ImageError> {
        match self {
            Self::Hex(s) => parse_hex(s),
            Self::Rgb(r, g, b) => Ok(Rgba::opaque(*r, *g, *b)),
            Self::Rgba(r, g, b, a) => Ok(Rgba::new(*r, *g, *b, a.clamp(0.0, 1.0))),
            Self::Named(NamedColor::Black) => Ok(Rgba::BLACK),
            Self::Named(NamedColor::White) => Ok(Rgba::WHITE),
            Self::Named(NamedColor::Transparent) => Ok(Rgba::TRANSPARENT),
        }
    }
}

impl From<&str> for ColorInput {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" => Self::Named(NamedColor::Black),
            "white" => Self::Named(NamedColor::White),
            "transparent" => Self::Named(NamedColor::Transparent),
            _ => Self::Hex(s.to_string()),
        }
    }
}

impl From<(u8, u8, u8)> for ColorInput {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::Rgb(r, g, b)
    }
}

impl From<(u8, u8, u8, f32)> for ColorInput {
    fn from((r, g, b, a): (u8, u8, u8, f32)) -> Self {
        Self::Rgba(r, g, b, a)
    }
}

impl From<Rgba> for ColorInput {
    fn from(c: Rgba) -> Self {
        Self::Rgba(c.r, c.g, c.b, c.a)
    }
}

/// Normalize an optional color input. Absent means opaque white.
pub fn normalize(input: Option<&ColorInput>) -> Result<Rgba, ImageError> {
    match input {
        Some(color) => color.normalize(),
        None => Ok(Rgba::WHITE),
    }
}

/// Hex alpha byte to a whole percentage, 0 through 100.
pub fn hex_to_percentage(byte: u8) -> u8 {
    (byte as f64 * 100.0 / 255.0).round() as u8
}

/// Percentage to a hex alpha byte. Values at or below `1.0` are read as
/// fractions (`0.5` is 50%), larger values as whole percents, so both the
/// stored alpha and user-facing percentages feed in directly.
pub fn percentage_to_hex(percentage: f32) -> u8 {
    let p = f64::from(percentage);
    let pct = if p <= 1.0 { p * 100.0 } else { p }.clamp(0.0, 100.0);
    (pct * 255.0 / 100.0).round() as u8
}

fn hex_digit(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

fn parse_hex(s: &str) -> Result<Rgba, ImageError> {
    let digits = s.trim().trim_start_matches('#').as_bytes();
    if !digits.iter().all(|b| b.is_ascii_hexdigit()) {
        return Err(ImageError::InvalidInput(format!("malformed hex color {s:?}")));
    }
    let byte = |i: usize| hex_digit(digits[i]) * 16 + hex_digit(digits[i + 1]);
    // Shorthand digits double up: #1af expands to #11aaff.
    let doubled = |i: usize| hex_digit(digits[i]) * 17;
    let (r, g, b, alpha_byte) = match digits.len() {
        3 => (doubled(0), doubled(1), doubled(2), 255),
        4 => (doubled(0), doubled(1), doubled(2), doubled(3)),
        6 => (byte(0), byte(2), byte(4), 255),
        8 => (byte(0), byte(2), byte(4), byte(6)),
        n => {
            return Err(ImageError::InvalidInput(format!(
                "hex color must have 3, 4, 6, or 8 digits, got {n}"
            )));
        }
    };
    let a = f32::from(hex_to_percentage(alpha_byte)) / 100.0;
    Ok(Rgba::new(r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ------------------------------------------------------------------
    // Hex parsing
    // ------------------------------------------------------------------

    #[test]
    fn six_digit_hex_is_opaque() {
        let c = ColorInput::Hex("#00ccff".into()).normalize().unwrap();
        assert_eq!(c, Rgba::new(0, 204, 255, 1.0));
    }

    #[test]
    fn eight_digit_hex_alpha_goes_through_percentage() {
        // 0x7f is 127, which rounds to 50% and so to an alpha of 0.5.
        let c = ColorInput::Hex("#00ccFF7f".into()).normalize().unwrap();
        assert_eq!(c, Rgba::new(0, 204, 255, 0.5));
    }

    #[test]
    fn shorthand_digits_double_up() {
        let c = ColorInput::Hex("1af".into()).normalize().unwrap();
        assert_eq!(c, Rgba::new(0x11, 0xaa, 0xff, 1.0));
        let c = ColorInput::Hex("#1af8".into()).normalize().unwrap();
        assert_eq!((c.r, c.g, c.b), (0x11, 0xaa, 0xff));
        assert_eq!(c.alpha_byte(), 0x88);
    }

    #[test]
    fn malformed_hex_is_invalid_input() {
        for bad in ["#12345", "zzz", "#gg0000", ""] {
            let err = ColorInput::Hex(bad.into()).normalize().unwrap_err();
            assert!(matches!(err, ImageError::InvalidInput(_)), "{bad:?}");
        }
    }

    // ------------------------------------------------------------------
    // Other input shapes
    // ------------------------------------------------------------------

    #[test]
    fn rgb_tuple_is_fully_opaque() {
        let c = ColorInput::from((10, 20, 30)).normalize().unwrap();
        assert_eq!(c, Rgba::new(10, 20, 30, 1.0));
    }

    #[test]
    fn rgba_tuple_clamps_alpha() {
        let c = ColorInput::from((1, 2, 3, 1.7)).normalize().unwrap();
        assert_eq!(c.a, 1.0);
        let c = ColorInput::from((1, 2, 3, -0.2)).normalize().unwrap();
        assert_eq!(c.a, 0.0);
    }

    #[test]
    fn named_transparent_is_white_with_zero_alpha() {
        let c = ColorInput::from("transparent").normalize().unwrap();
        assert_eq!(c, Rgba::new(255, 255, 255, 0.0));
    }

    #[test]
    fn absent_color_is_opaque_white() {
        assert_eq!(normalize(None).unwrap(), Rgba::WHITE);
    }

    #[test]
    fn strings_resolve_names_before_hex() {
        assert_eq!(ColorInput::from("Black"), ColorInput::Named(NamedColor::Black));
        assert_eq!(ColorInput::from("#000"), ColorInput::Hex("#000".into()));
    }

    // ------------------------------------------------------------------
    // Alpha percentage mapping and round trips
    // ------------------------------------------------------------------

    #[test]
    fn alpha_percentage_mapping() {
        assert_eq!(hex_to_percentage(0x00), 0);
        assert_eq!(hex_to_percentage(0x7f), 50);
        assert_eq!(hex_to_percentage(0xff), 100);
        assert_eq!(percentage_to_hex(0.0), 0);
        assert_eq!(percentage_to_hex(50.0), 128);
        assert_eq!(percentage_to_hex(100.0), 255);
        // Fractions are read as fractions, not sub-1% percentages.
        assert_eq!(percentage_to_hex(0.5), 128);
        assert_eq!(percentage_to_hex(1.0), 255);
    }

    #[test]
    fn to_hex_formats_lowercase() {
        let c = Rgba::new(0, 204, 255, 0.5);
        assert_eq!(c.to_hex(false), "#00ccff");
        assert_eq!(c.to_hex(true), "#00ccff80");
    }

    proptest! {
        #[test]
        fn hex_round_trip_preserves_channels(r: u8, g: u8, b: u8, pct in 0u8..=100) {
            let c = Rgba::new(r, g, b, f32::from(pct) / 100.0);
            let back = ColorInput::Hex(c.to_hex(true)).normalize().unwrap();
            prop_assert_eq!((back.r, back.g, back.b), (r, g, b));
            // Alpha survives to within one hex step.
            prop_assert!((back.a - c.a).abs() <= 1.5 / 255.0);
        }

        #[test]
        fn normalize_is_idempotent(r: u8, g: u8, b: u8, pct in 0u8..=100) {
            let c = Rgba::new(r, g, b, f32::from(pct) / 100.0);
            let again = ColorInput::from(c).normalize().unwrap();
            prop_assert_eq!(again, c);
        }
    }
}
