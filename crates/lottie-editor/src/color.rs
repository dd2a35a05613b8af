//! Conversion between Lottie's normalized RGB(A) vectors and `#rrggbb` strings.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected `#rrggbb`, got {0:?}")]
    Malformed(String),
}

fn channel_to_byte(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Renders the first three channels as lowercase `#rrggbb`. Alpha is ignored.
///
/// Missing channels read as 0.
pub fn to_hex(rgba: &[f64]) -> String {
    let channel = |i: usize| channel_to_byte(rgba.get(i).copied().unwrap_or(0.0));
    format!("#{:02x}{:02x}{:02x}", channel(0), channel(1), channel(2))
}

/// Parses `#rrggbb` into a normalized vector with alpha fixed to 1.
///
/// The input must already be well-formed (see [`HexColor`] for the checked path);
/// unparsable pairs read as 0.
pub fn from_hex(hex: &str) -> [f64; 4] {
    let pair = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .unwrap_or(0) as f64
            / 255.0
    };
    [pair(1..3), pair(3..5), pair(5..7), 1.0]
}

/// A validated `#rrggbb` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub fn to_rgba(&self) -> [f64; 4] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
            1.0,
        ]
    }

    pub fn from_rgba(rgba: &[f64]) -> Self {
        let channel = |i: usize| channel_to_byte(rgba.get(i).copied().unwrap_or(0.0));
        HexColor {
            r: channel(0),
            g: channel(1),
            b: channel(2),
        }
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ColorParseError::Malformed(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(malformed)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| malformed());
        Ok(HexColor {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
        })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex_rounds_channels() {
        assert_eq!(to_hex(&[0.8, 0.2, 0.2, 1.0]), "#cc3333");
        assert_eq!(to_hex(&[1.0, 1.0, 1.0]), "#ffffff");
        assert_eq!(to_hex(&[0.0, 0.0, 0.0, 0.5]), "#000000");
        // 0.5 * 255 = 127.5 rounds up
        assert_eq!(to_hex(&[0.5, 0.0, 0.0]), "#800000");
    }

    #[test]
    fn test_from_hex_fixes_alpha() {
        assert_eq!(from_hex("#00ff00"), [0.0, 1.0, 0.0, 1.0]);
        let [r, g, b, a] = from_hex("#cc3333");
        assert!((r - 0.8).abs() < 1e-12);
        assert!((g - 0.2).abs() < 1e-12);
        assert!((b - 0.2).abs() < 1e-12);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn test_every_byte_round_trips() {
        for value in 0..=255u8 {
            let hex = format!("#{:02x}{:02x}{:02x}", value, 255 - value, value / 2);
            assert_eq!(to_hex(&from_hex(&hex)), hex);
            assert_eq!(to_hex(&from_hex(&hex.to_uppercase())), hex);
        }
    }

    #[test]
    fn test_hex_color_parse() {
        let color: HexColor = "#A1b2C3".parse().unwrap();
        assert_eq!(color, HexColor { r: 0xa1, g: 0xb2, b: 0xc3 });
        assert_eq!(color.to_string(), "#a1b2c3");
        assert_eq!(to_hex(&color.to_rgba()), "#a1b2c3");
        assert_eq!(HexColor::from_rgba(&[0.8, 0.2, 0.2]).to_string(), "#cc3333");

        for bad in ["a1b2c3", "#a1b2c", "#a1b2c3d", "#zzzzzz", "", "#ab€123"] {
            assert!(bad.parse::<HexColor>().is_err(), "{bad:?} should be rejected");
        }
    }
}
