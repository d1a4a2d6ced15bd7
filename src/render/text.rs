use std::collections::HashMap;

use crate::assets::color::Color;
use crate::assets::fonts::{FontBook, ResolvedFont};
use crate::foundation::core::{Affine, Vec2};
use crate::foundation::error::{TextBehindError, TextBehindResult};
use crate::layer::model::{TextAlign, TextLayer};
use crate::render::blur::{gaussian_blur_premul, radius_for_sigma};
use crate::render::composite::{over_at, over_in_place};
use crate::render::surface::Surface;

/// One glyph of a shaped line, in layout space (origin at the line box top-left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PlacedGlyph {
    pub(crate) id: u32,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// A single shaped line of text.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ShapedLine {
    pub(crate) glyphs: Vec<PlacedGlyph>,
    pub(crate) width: f32,
    /// Distance from the top of the layout box to the first alphabetic baseline.
    pub(crate) baseline: f32,
    pub(crate) font_size: f32,
}

/// Stateful helper for shaping text with Parley from resolved font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    registered: HashMap<(String, u32), String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    fn family_name(&mut self, font: &ResolvedFont) -> TextBehindResult<String> {
        let key = (font.family.clone(), font.index);
        if let Some(name) = self.registered.get(&key) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.data.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            TextBehindError::render(format!("font '{}' registered no families", font.family))
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| TextBehindError::render("registered font family has no name"))?
            .to_string();

        self.registered.insert(key, name.clone());
        Ok(name)
    }

    /// Shape `text` as one unwrapped line.
    pub(crate) fn shape_line(
        &mut self,
        text: &str,
        font: &ResolvedFont,
        size_px: f32,
    ) -> TextBehindResult<ShapedLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(TextBehindError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_name(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let mut line = ShapedLine {
            width: layout.width(),
            font_size: size_px,
            ..ShapedLine::default()
        };
        let mut first = true;
        for l in layout.lines() {
            if first {
                line.baseline = l.metrics().baseline;
                first = false;
            }
            for item in l.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                line.glyphs.extend(run.positioned_glyphs().map(|g| PlacedGlyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));
            }
        }
        Ok(line)
    }
}

/// Draws text layers into a render target.
///
/// Each layer gets a fresh `vello_cpu` context, so no paint state leaks between layers.
pub(crate) struct TextPainter {
    layout: TextLayoutEngine,
    cpu_fonts: HashMap<(String, u32), vello_cpu::peniko::FontData>,
    shadow_offset_y: f64,
}

impl TextPainter {
    pub(crate) fn new(shadow_offset_y: f64) -> Self {
        Self {
            layout: TextLayoutEngine::new(),
            cpu_fonts: HashMap::new(),
            shadow_offset_y,
        }
    }

    fn cpu_font(&mut self, font: &ResolvedFont) -> vello_cpu::peniko::FontData {
        self.cpu_fonts
            .entry((font.family.clone(), font.index))
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.data.as_ref().clone()),
                    font.index,
                )
            })
            .clone()
    }

    /// Paint one layer over `target`. Returns `false` when the layer had nothing to draw.
    pub(crate) fn paint_layer(
        &mut self,
        fonts: &mut FontBook,
        target: &mut Surface,
        layer: &TextLayer,
    ) -> TextBehindResult<bool> {
        if layer.text.is_empty() || layer.opacity <= 0.0 {
            return Ok(false);
        }
        let Some(font) = fonts.resolve(&layer.font_family) else {
            tracing::warn!(
                layer = %layer.id,
                family = %layer.font_family,
                "layer skipped: no font"
            );
            return Ok(false);
        };

        let shaped = self
            .layout
            .shape_line(&layer.text, &font, layer.font_size as f32)?;
        if shaped.glyphs.is_empty() {
            return Ok(false);
        }
        let cpu_font = self.cpu_font(&font);
        let transform = layer_transform(target, layer, &shaped);
        let opacity = layer.opacity as f32;
        let outline = (layer.outline_width > 0.0).then_some(layer.outline_width);

        if layer.shadow_blur > 0.0 && layer.shadow_color.a > 0 {
            let shadow_transform =
                Affine::translate(Vec2::new(0.0, self.shadow_offset_y)) * transform;
            let silhouette = rasterize_glyphs(
                target,
                &cpu_font,
                &shaped,
                shadow_transform,
                outline.map(|w| (w, layer.shadow_color)),
                layer.shadow_color,
                opacity,
            )?;
            // Canvas shadowBlur is twice the gaussian standard deviation.
            let sigma = (layer.shadow_blur / 2.0) as f32;
            if let Some(bounds) = silhouette.opaque_bounds() {
                // Beyond one kernel radius of the glyphs the blurred shadow is transparent.
                let region = bounds.padded(radius_for_sigma(sigma) + 1, target.canvas());
                let mut shadow = silhouette.crop(region)?;
                let blurred =
                    gaussian_blur_premul(shadow.data(), region.width, region.height, sigma)?;
                shadow.data_mut().copy_from_slice(&blurred);
                over_at(target, &shadow, region.x, region.y)?;
            }
        }

        let glyphs = rasterize_glyphs(
            target,
            &cpu_font,
            &shaped,
            transform,
            outline.map(|w| (w, layer.outline_color)),
            layer.color,
            opacity,
        )?;
        over_in_place(target.data_mut(), glyphs.data(), 1.0)?;
        Ok(true)
    }
}

/// Layout space → canvas space: baseline at the anchor, aligned, rotated about the anchor.
pub(crate) fn layer_transform(target: &Surface, layer: &TextLayer, shaped: &ShapedLine) -> Affine {
    let anchor = target.canvas().anchor(layer.x, layer.y);
    let dx = match layer.text_align {
        TextAlign::Left => 0.0,
        TextAlign::Center => f64::from(shaped.width) / 2.0,
        TextAlign::Right => f64::from(shaped.width),
    };
    Affine::translate(anchor.to_vec2())
        * Affine::rotate(layer.rotation.to_radians())
        * Affine::translate(Vec2::new(-dx, -f64::from(shaped.baseline)))
}

fn rasterize_glyphs(
    target: &Surface,
    font: &vello_cpu::peniko::FontData,
    shaped: &ShapedLine,
    transform: Affine,
    stroke: Option<(f64, Color)>,
    fill: Color,
    opacity: f32,
) -> TextBehindResult<Surface> {
    let (w, h) = (target.width_u16(), target.height_u16());
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(affine_to_cpu(transform));
    let glyphs = || {
        shaped.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x,
            y: g.y,
        })
    };

    if let Some((width, color)) = stroke {
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        ctx.set_paint(color_to_cpu(color));
        ctx.glyph_run(font)
            .font_size(shaped.font_size)
            .stroke_glyphs(glyphs());
        if opacity < 1.0 {
            ctx.pop_layer();
        }
    }

    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.set_paint(color_to_cpu(fill));
    ctx.glyph_run(font)
        .font_size(shaped.font_size)
        .fill_glyphs(glyphs());
    if opacity < 1.0 {
        ctx.pop_layer();
    }

    ctx.flush();
    let mut pixmap = target.blank_pixmap();
    ctx.render_to_pixmap(&mut pixmap);
    Surface::from_premul(target.canvas(), pixmap.data_as_u8_slice().to_vec())
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
