//! Strictly validated RGBA colors.
//!
//! Accepted forms are `#rgb`, `#rrggbb`, `#rrggbbaa` and `transparent`.
//! Anything else is rejected rather than passed through.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Alpha as a 0..=1 float.
    pub fn alpha_f32(&self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Same color with alpha multiplied by `factor` (clamped to 0..=1).
    pub fn with_opacity(&self, factor: f64) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self {
            a: (self.a as f64 * factor).round() as u8,
            ..*self
        }
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.eq_ignore_ascii_case("transparent") {
            return Ok(Color::TRANSPARENT);
        }

        let invalid = || ValidationError::new(format!("Invalid color: {:?}", s));
        let hex = input.strip_prefix('#').ok_or_else(invalid)?;
        let digits = hex
            .bytes()
            .map(hex_digit)
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(invalid)?;

        match digits.len() {
            3 => Ok(Color::rgb(
                digits[0] * 17,
                digits[1] * 17,
                digits[2] * 17,
            )),
            6 | 8 => {
                let byte = |i: usize| digits[i] * 16 + digits[i + 1];
                let a = if digits.len() == 8 { byte(6) } else { 255 };
                Ok(Color::rgba(byte(0), byte(2), byte(4), a))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#FF8000".parse::<Color>().unwrap(), Color::rgb(255, 128, 0));
        assert_eq!(
            "#11223344".parse::<Color>().unwrap(),
            Color::rgba(0x11, 0x22, 0x33, 0x44)
        );
        assert_eq!(
            "transparent".parse::<Color>().unwrap(),
            Color::TRANSPARENT
        );
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "#", "#12", "#12345", "#1234567", "#gggggg", "red", "ff0000", "#ff0000 x"] {
            assert!(bad.parse::<Color>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_display_round_trip() {
        let c = Color::rgba(1, 2, 3, 4);
        assert_eq!(c.to_string(), "#01020304");
        assert_eq!(c.to_string().parse::<Color>().unwrap(), c);
        assert_eq!(Color::rgb(171, 205, 239).to_string(), "#abcdef");
    }

    #[test]
    fn test_serde_uses_hex_strings() {
        let json = serde_json::to_string(&Color::rgb(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        assert!(serde_json::from_str::<Color>("\"#zz0000\"").is_err());
    }

    #[test]
    fn test_with_opacity() {
        assert_eq!(Color::WHITE.with_opacity(0.5).a, 128);
        assert_eq!(Color::WHITE.with_opacity(2.0).a, 255);
    }
}
