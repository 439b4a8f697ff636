//! RGBA color type, parsed from the Tk-style names and hex strings used in
//! simulation configuration files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized color `{0}`")]
pub struct ParseColorError(pub String);

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    // Tk's "green" is the X11 half-intensity green
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GRAY: Color = Color::rgb(190, 190, 190);
    /// Grid line color, `#ccc`
    pub const LIGHT_GRAY: Color = Color::rgb(0xcc, 0xcc, 0xcc);

    fn named(name: &str) -> Option<Color> {
        let color = match name {
            "white" => Color::WHITE,
            "black" => Color::BLACK,
            "red" => Color::RED,
            "green" => Color::GREEN,
            "blue" => Color::BLUE,
            "gray" | "grey" => Color::GRAY,
            "lightgray" | "lightgrey" => Color::rgb(211, 211, 211),
            "darkgray" | "darkgrey" => Color::rgb(169, 169, 169),
            "yellow" => Color::rgb(255, 255, 0),
            "orange" => Color::rgb(255, 165, 0),
            "purple" => Color::rgb(160, 32, 240),
            "cyan" => Color::rgb(0, 255, 255),
            "magenta" => Color::rgb(255, 0, 255),
            "brown" => Color::rgb(165, 42, 42),
            "pink" => Color::rgb(255, 192, 203),
            _ => return None,
        };
        Some(color)
    }

    fn from_hex(digits: &str) -> Option<Color> {
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let mut it = digits.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Color::rgb(it.next()??, it.next()??, it.next()??))
            }
            6 => Some(Color::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Some(Color::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => None,
        }
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_prefix('#') {
            Some(digits) => Color::from_hex(digits),
            None => Color::named(&trimmed.to_ascii_lowercase()),
        };
        parsed.ok_or_else(|| ParseColorError(s.to_owned()))
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}
