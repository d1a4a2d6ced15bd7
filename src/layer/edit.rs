use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::layer::model::{
    FONT_SIZE_RANGE, OPACITY_RANGE, OUTLINE_WIDTH_RANGE, POSITION_PCT_RANGE, ROTATION_DEG_RANGE,
    SHADOW_BLUR_RANGE, TextAlign, TextLayer, clamp_finite,
};

/// A partial edit of one layer, as produced by an editing widget.
///
/// Applying a patch is the single place where out-of-range numbers are clamped; the history and
/// the renderer only ever see in-bounds layers. Non-finite numbers leave the field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerPatch {
    /// New text content.
    pub text: Option<String>,
    /// New anchor x, percent.
    pub x: Option<f64>,
    /// New anchor y, percent.
    pub y: Option<f64>,
    /// New font size, pixels.
    pub font_size: Option<f64>,
    /// New font family.
    pub font_family: Option<String>,
    /// New fill color.
    pub color: Option<Color>,
    /// New rotation, degrees.
    pub rotation: Option<f64>,
    /// New opacity.
    pub opacity: Option<f64>,
    /// New outline width, pixels.
    pub outline_width: Option<f64>,
    /// New outline color.
    pub outline_color: Option<Color>,
    /// New shadow blur, pixels.
    pub shadow_blur: Option<f64>,
    /// New shadow color.
    pub shadow_color: Option<Color>,
    /// New alignment.
    pub text_align: Option<TextAlign>,
}

impl LayerPatch {
    /// A patch that sets every field to `layer`'s value.
    pub fn from_layer(layer: &TextLayer) -> Self {
        Self {
            text: Some(layer.text.clone()),
            x: Some(layer.x),
            y: Some(layer.y),
            font_size: Some(layer.font_size),
            font_family: Some(layer.font_family.clone()),
            color: Some(layer.color),
            rotation: Some(layer.rotation),
            opacity: Some(layer.opacity),
            outline_width: Some(layer.outline_width),
            outline_color: Some(layer.outline_color),
            shadow_blur: Some(layer.shadow_blur),
            shadow_color: Some(layer.shadow_color),
            text_align: Some(layer.text_align),
        }
    }

    /// Return `true` when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produce the edited layer. The identity is always kept from `base`.
    pub fn apply(&self, base: &TextLayer) -> TextLayer {
        let num = |patch: Option<f64>, current: f64, range: (f64, f64)| match patch {
            Some(v) => clamp_finite(v, range, current),
            None => current,
        };

        TextLayer {
            id: base.id.clone(),
            text: self.text.clone().unwrap_or_else(|| base.text.clone()),
            x: num(self.x, base.x, POSITION_PCT_RANGE),
            y: num(self.y, base.y, POSITION_PCT_RANGE),
            font_size: num(self.font_size, base.font_size, FONT_SIZE_RANGE),
            font_family: self
                .font_family
                .clone()
                .unwrap_or_else(|| base.font_family.clone()),
            color: self.color.unwrap_or(base.color),
            rotation: num(self.rotation, base.rotation, ROTATION_DEG_RANGE),
            opacity: num(self.opacity, base.opacity, OPACITY_RANGE),
            outline_width: num(self.outline_width, base.outline_width, OUTLINE_WIDTH_RANGE),
            outline_color: self.outline_color.unwrap_or(base.outline_color),
            shadow_blur: num(self.shadow_blur, base.shadow_blur, SHADOW_BLUR_RANGE),
            shadow_color: self.shadow_color.unwrap_or(base.shadow_color),
            text_align: self.text_align.unwrap_or(base.text_align),
        }
    }

    /// Set the text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the anchor position in percent.
    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Set the font size.
    pub fn font_size(mut self, px: f64) -> Self {
        self.font_size = Some(px);
        self
    }

    /// Set the font family.
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Set the fill color.
    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the rotation.
    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    /// Set the opacity.
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Set the outline width and color.
    pub fn outline(mut self, width: f64, color: Color) -> Self {
        self.outline_width = Some(width);
        self.outline_color = Some(color);
        self
    }

    /// Set the shadow blur and color.
    pub fn shadow(mut self, blur: f64, color: Color) -> Self {
        self.shadow_blur = Some(blur);
        self.shadow_color = Some(color);
        self
    }

    /// Set the alignment.
    pub fn align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/edit.rs"]
mod tests;
