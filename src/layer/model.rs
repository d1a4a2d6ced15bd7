use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;

/// Inclusive bounds for [`TextLayer::x`] and [`TextLayer::y`] (percent of canvas).
pub const POSITION_PCT_RANGE: (f64, f64) = (0.0, 100.0);
/// Inclusive bounds for [`TextLayer::font_size`] in pixels.
pub const FONT_SIZE_RANGE: (f64, f64) = (12.0, 400.0);
/// Inclusive bounds for [`TextLayer::opacity`].
pub const OPACITY_RANGE: (f64, f64) = (0.0, 1.0);
/// Inclusive bounds for [`TextLayer::rotation`] in degrees.
pub const ROTATION_DEG_RANGE: (f64, f64) = (-180.0, 180.0);
/// Inclusive bounds for [`TextLayer::outline_width`] in pixels.
pub const OUTLINE_WIDTH_RANGE: (f64, f64) = (0.0, 10.0);
/// Inclusive bounds for [`TextLayer::shadow_blur`] in pixels.
pub const SHADOW_BLUR_RANGE: (f64, f64) = (0.0, 20.0);

/// Opaque, stable identity of a text layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Wrap an existing token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Horizontal placement of text relative to its anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Text starts at the anchor.
    Left,
    /// Text is centered on the anchor.
    #[default]
    Center,
    /// Text ends at the anchor.
    Right,
}

/// One styled text element of the layer stack.
///
/// Numeric fields are expected to be within the `*_RANGE` bounds at rest; construct edits through
/// [`LayerPatch`](crate::LayerPatch) or call [`TextLayer::clamped`] before storing a layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    /// Stable identity; never changes after creation.
    pub id: LayerId,
    /// Text content (may be empty).
    pub text: String,
    /// Anchor x as percent of canvas width.
    pub x: f64,
    /// Anchor y as percent of canvas height.
    pub y: f64,
    /// Font size in pixels.
    pub font_size: f64,
    /// Requested font family.
    pub font_family: String,
    /// Fill color.
    pub color: Color,
    /// Rotation about the anchor, degrees (positive is clockwise on screen).
    pub rotation: f64,
    /// Global alpha applied to every paint operation of this layer.
    pub opacity: f64,
    /// Outline stroke width in pixels; `0` disables the outline.
    pub outline_width: f64,
    /// Outline color.
    pub outline_color: Color,
    /// Drop-shadow blur radius in pixels; `0` disables the shadow.
    pub shadow_blur: f64,
    /// Drop-shadow color.
    pub shadow_color: Color,
    /// Horizontal alignment.
    pub text_align: TextAlign,
}

impl TextLayer {
    /// A layer with the editor's default styling.
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            text: "New Text".to_owned(),
            x: 50.0,
            y: 50.0,
            font_size: 24.0,
            font_family: "Arial".to_owned(),
            color: Color::WHITE,
            rotation: 0.0,
            opacity: 1.0,
            outline_width: 2.0,
            outline_color: Color::BLACK,
            shadow_blur: 4.0,
            shadow_color: Color::rgba(0, 0, 0, 128),
            text_align: TextAlign::Center,
        }
    }

    /// Same layer with a different text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Copy with every numeric field forced into its bounds.
    ///
    /// Non-finite values fall back to the default layer's value for that field.
    pub fn clamped(mut self) -> Self {
        let d = Self::new(self.id.clone());
        self.x = clamp_finite(self.x, POSITION_PCT_RANGE, d.x);
        self.y = clamp_finite(self.y, POSITION_PCT_RANGE, d.y);
        self.font_size = clamp_finite(self.font_size, FONT_SIZE_RANGE, d.font_size);
        self.rotation = clamp_finite(self.rotation, ROTATION_DEG_RANGE, d.rotation);
        self.opacity = clamp_finite(self.opacity, OPACITY_RANGE, d.opacity);
        self.outline_width = clamp_finite(self.outline_width, OUTLINE_WIDTH_RANGE, d.outline_width);
        self.shadow_blur = clamp_finite(self.shadow_blur, SHADOW_BLUR_RANGE, d.shadow_blur);
        self
    }

    /// Return `true` when every numeric field is within its bounds.
    pub fn is_in_bounds(&self) -> bool {
        let within = |v: f64, (lo, hi): (f64, f64)| v.is_finite() && lo <= v && v <= hi;
        within(self.x, POSITION_PCT_RANGE)
            && within(self.y, POSITION_PCT_RANGE)
            && within(self.font_size, FONT_SIZE_RANGE)
            && within(self.rotation, ROTATION_DEG_RANGE)
            && within(self.opacity, OPACITY_RANGE)
            && within(self.outline_width, OUTLINE_WIDTH_RANGE)
            && within(self.shadow_blur, SHADOW_BLUR_RANGE)
    }
}

pub(crate) fn clamp_finite(v: f64, (lo, hi): (f64, f64), fallback: f64) -> f64 {
    if v.is_finite() { v.clamp(lo, hi) } else { fallback }
}

/// Ordered layers; later entries paint over earlier ones.
pub type LayerList = Vec<TextLayer>;

#[cfg(test)]
#[path = "../../tests/unit/layer/model.rs"]
mod tests;
