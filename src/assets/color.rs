use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{TextBehindError, TextBehindResult};

/// Straight-alpha sRGB color, parsed from CSS color strings.
///
/// Accepted forms: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, `rgb(r, g, b)`, `rgba(r, g, b, a)`
/// (channels `0..=255`, alpha `0..=1`) and a handful of named colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (straight).
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);

    /// Build a color from straight RGBA8 channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS color string.
    pub fn parse(s: &str) -> TextBehindResult<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return parse_hex(s);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            return parse_rgb_fn(args);
        }
        named(&lower).ok_or_else(|| TextBehindError::validation(format!("unknown color \"{s}\"")))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02X}{:02X}{:02X}{:02X}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl FromStr for Color {
    type Err = TextBehindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_hex(s: &str) -> TextBehindResult<Color> {
    let digits = s.trim_start_matches('#');

    fn nibble(c: u8) -> Option<u8> {
        (c as char).to_digit(16).map(|d| d as u8)
    }
    let bad = || {
        TextBehindError::validation(format!(
            "hex color \"{s}\" must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA"
        ))
    };

    let n: Vec<u8> = digits
        .bytes()
        .map(nibble)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(bad)?;
    let (r, g, b, a) = match n.len() {
        3 => (n[0] * 17, n[1] * 17, n[2] * 17, 255),
        4 => (n[0] * 17, n[1] * 17, n[2] * 17, n[3] * 17),
        6 => (n[0] << 4 | n[1], n[2] << 4 | n[3], n[4] << 4 | n[5], 255),
        8 => (
            n[0] << 4 | n[1],
            n[2] << 4 | n[3],
            n[4] << 4 | n[5],
            n[6] << 4 | n[7],
        ),
        _ => return Err(bad()),
    };
    Ok(Color::rgba(r, g, b, a))
}

fn parse_rgb_fn(args: &str) -> TextBehindResult<Color> {
    let inner = args
        .strip_suffix(')')
        .ok_or_else(|| TextBehindError::validation("rgb()/rgba() color is missing ')'"))?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(TextBehindError::validation(
            "rgb()/rgba() color expects 3 or 4 components",
        ));
    }

    let channel = |p: &str| -> TextBehindResult<u8> {
        let v: f64 = p
            .parse()
            .map_err(|_| TextBehindError::validation(format!("invalid color channel \"{p}\"")))?;
        Ok(v.clamp(0.0, 255.0).round() as u8)
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(p) => {
            let v: f64 = p.parse().map_err(|_| {
                TextBehindError::validation(format!("invalid alpha component \"{p}\""))
            })?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Ok(Color::rgba(r, g, b, a))
}

fn named(name: &str) -> Option<Color> {
    let c = match name {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgba(255, 0, 0, 255),
        "green" => Color::rgba(0, 128, 0, 255),
        "lime" => Color::rgba(0, 255, 0, 255),
        "blue" => Color::rgba(0, 0, 255, 255),
        "yellow" => Color::rgba(255, 255, 0, 255),
        "gray" | "grey" => Color::rgba(128, 128, 128, 255),
        "transparent" => Color::rgba(0, 0, 0, 0),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
