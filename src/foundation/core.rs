use crate::foundation::error::{TextBehindError, TextBehindResult};

pub use kurbo::{Affine, Point, Vec2};

/// Pixel dimensions of an image and of every render target derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create validated, non-empty dimensions.
    pub fn new(width: u32, height: u32) -> TextBehindResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextBehindError::validation("canvas dimensions must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels.
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        self.pixel_count().saturating_mul(4)
    }

    /// Map a percentage position (`0..=100` on each axis) to canvas pixel space.
    pub fn anchor(self, x_pct: f64, y_pct: f64) -> Point {
        Point::new(
            x_pct / 100.0 * f64::from(self.width),
            y_pct / 100.0 * f64::from(self.height),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
