//! Hex color parsing.

use image::Rgba;
use tracing::warn;

use crate::{PosterError, Result};

/// Default text color (dark slate).
pub const DEFAULT_TEXT_COLOR: &str = "#1C2833";

/// An RGB color with an alpha channel (255 = opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#RGB` / `#RRGGBB` (the `#` is optional).
    ///
    /// Unlike [`hex_to_rgb`], malformed input is rejected.
    pub fn from_hex(hex: &str) -> Result<Self> {
        parse_hex(hex)
            .map(|(r, g, b)| Self::rgb(r, g, b))
            .ok_or_else(|| PosterError::InvalidColor(hex.to_string()))
    }

    /// Lenient parse: anything [`Color::from_hex`] rejects becomes black.
    pub fn from_hex_lossy(hex: &str) -> Self {
        let (r, g, b) = hex_to_rgb(hex);
        Self::rgb(r, g, b)
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Convert a hex color string into an `(r, g, b)` triple.
///
/// Accepts 6-digit and 3-digit shorthand forms with or without a leading
/// `#`. Any other length, or a non-hex digit, yields `(0, 0, 0)`.
pub fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    parse_hex(hex).unwrap_or_else(|| {
        warn!(hex, "Unrecognized hex color, falling back to black");
        (0, 0, 0)
    })
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.is_ascii() {
        return None;
    }
    let pair = |s: &str| u8::from_str_radix(s, 16).ok();

    match digits.len() {
        6 => Some((pair(&digits[0..2])?, pair(&digits[2..4])?, pair(&digits[4..6])?)),
        3 => {
            // Shorthand: each digit d expands to dd, i.e. d * 17.
            let mut it = digits.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some((it.next()??, it.next()??, it.next()??))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_digit_forms() {
        assert_eq!(hex_to_rgb("#FFFFFF"), (255, 255, 255));
        assert_eq!(hex_to_rgb("1C2833"), (0x1C, 0x28, 0x33));
        assert_eq!(hex_to_rgb("#00ff7f"), (0, 255, 127));
    }

    #[test]
    fn shorthand_forms() {
        assert_eq!(hex_to_rgb("000"), (0, 0, 0));
        assert_eq!(hex_to_rgb("abc"), (170, 187, 204));
        assert_eq!(hex_to_rgb("#F0a"), (255, 0, 170));
    }

    #[test]
    fn bad_input_falls_back_to_black() {
        assert_eq!(hex_to_rgb("12"), (0, 0, 0));
        assert_eq!(hex_to_rgb(""), (0, 0, 0));
        assert_eq!(hex_to_rgb("#"), (0, 0, 0));
        assert_eq!(hex_to_rgb("#12345678"), (0, 0, 0));
        assert_eq!(hex_to_rgb("zzzzzz"), (0, 0, 0));
        assert_eq!(hex_to_rgb("ééé"), (0, 0, 0));
    }

    #[test]
    fn strict_parse_rejects_bad_input() {
        assert_eq!(Color::from_hex("#abc").unwrap(), Color::rgb(170, 187, 204));
        assert!(matches!(
            Color::from_hex("12"),
            Err(PosterError::InvalidColor(s)) if s == "12"
        ));
        assert!(Color::from_hex("#GGGGGG").is_err());
    }

    #[test]
    fn lossy_parse_is_opaque() {
        let c = Color::from_hex_lossy("nope");
        assert_eq!(c, Color::BLACK);
        assert_eq!(c.to_rgba(), Rgba([0, 0, 0, 255]));
        assert_eq!(Color::rgb(1, 2, 3).with_alpha(9).to_rgba(), Rgba([1, 2, 3, 9]));
    }
}
