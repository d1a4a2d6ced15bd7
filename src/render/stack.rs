use crate::assets::decode::{DecodedImage, encode_png};
use crate::assets::fonts::{FontBook, FontOpts};
use crate::foundation::core::Canvas;
use crate::foundation::error::{TextBehindError, TextBehindResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::layer::model::TextLayer;
use crate::mask::feather::AlphaMatte;
use crate::render::blur::{MAX_BLUR_PX, gaussian_blur_premul};
use crate::render::composite::{over_in_place, with_matte_alpha};
use crate::render::surface::Surface;
use crate::render::text::TextPainter;

/// Vertical drop-shadow offset in pixels used by the editor.
pub const DEFAULT_SHADOW_OFFSET_Y: f64 = 2.0;

/// Renderer configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererOpts {
    /// Where fonts come from.
    pub fonts: FontOpts,
    /// Downward shadow offset, pixels.
    pub shadow_offset_y: f64,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            fonts: FontOpts::default(),
            shadow_offset_y: DEFAULT_SHADOW_OFFSET_Y,
        }
    }
}

impl RendererOpts {
    /// Return options with different font sources.
    pub fn with_fonts(mut self, fonts: FontOpts) -> Self {
        self.fonts = fonts;
        self
    }
}

/// A composited frame: premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    canvas: Canvas,
    data: Vec<u8>,
}

impl Raster {
    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let i = (y as usize * self.canvas.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Copy of the frame as straight-alpha RGBA8.
    pub fn to_rgba8_straight(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// Encode the frame as PNG. No re-rendering happens.
    pub fn to_png(&self) -> TextBehindResult<Vec<u8>> {
        encode_png(
            self.canvas.width,
            self.canvas.height,
            &self.to_rgba8_straight(),
        )
    }
}

/// Everything one frame depends on.
#[derive(Clone, Copy, Debug)]
pub struct RenderInput<'a> {
    /// Source photo.
    pub image: &'a DecodedImage,
    /// Subject matte; `None` renders the plain photo on top.
    pub matte: Option<&'a AlphaMatte>,
    /// Text layers, bottom first.
    pub layers: &'a [TextLayer],
    /// Background blur, pixels of standard deviation.
    pub blur_px: f32,
}

/// Background → text → subject compositor.
///
/// Every call renders the whole frame from its inputs into freshly acquired targets; nothing is
/// carried over between calls except font caches.
pub struct LayerStackRenderer {
    fonts: FontBook,
    painter: TextPainter,
}

impl std::fmt::Debug for LayerStackRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerStackRenderer")
            .field("fonts", &self.fonts)
            .finish_non_exhaustive()
    }
}

impl LayerStackRenderer {
    /// Build a renderer, loading fonts per `opts`.
    pub fn new(opts: &RendererOpts) -> Self {
        Self::with_font_book(FontBook::new(&opts.fonts), opts.shadow_offset_y)
    }

    /// Build a renderer around an existing font book.
    pub fn with_font_book(fonts: FontBook, shadow_offset_y: f64) -> Self {
        Self {
            fonts,
            painter: TextPainter::new(shadow_offset_y),
        }
    }

    /// The font book used for text layers.
    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Render one frame.
    ///
    /// Fails without producing any frame when a render target cannot be acquired or the matte does
    /// not match the image.
    #[tracing::instrument(skip_all, fields(
        width = input.image.width(),
        height = input.image.height(),
        layers = input.layers.len(),
        matte = input.matte.is_some(),
        blur_px = input.blur_px,
    ))]
    pub fn render(&mut self, input: RenderInput<'_>) -> TextBehindResult<Raster> {
        let canvas = input.image.canvas();
        if let Some(matte) = input.matte
            && matte.canvas() != canvas
        {
            return Err(TextBehindError::render(format!(
                "matte {}x{} does not match image {}x{}",
                matte.width(),
                matte.height(),
                canvas.width,
                canvas.height
            )));
        }

        let mut out = Surface::acquire(canvas)?;
        let background = background_pass(input.image, input.blur_px)?;
        let text = self.text_pass(canvas, input.layers)?;
        let top = match input.matte {
            Some(matte) => subject_pass(input.image, matte)?,
            None => Surface::from_premul(canvas, input.image.to_rgba8_premul())?,
        };

        out.clear();
        over_in_place(out.data_mut(), background.data(), 1.0)?;
        over_in_place(out.data_mut(), text.data(), 1.0)?;
        over_in_place(out.data_mut(), top.data(), 1.0)?;

        Ok(Raster {
            canvas,
            data: out.into_data(),
        })
    }

    #[tracing::instrument(skip_all, fields(layers = layers.len()))]
    fn text_pass(&mut self, canvas: Canvas, layers: &[TextLayer]) -> TextBehindResult<Surface> {
        let mut target = Surface::acquire(canvas)?;
        let mut drawn = 0usize;
        for layer in layers {
            if self.painter.paint_layer(&mut self.fonts, &mut target, layer)? {
                drawn += 1;
            }
        }
        tracing::debug!(drawn, "text pass done");
        Ok(target)
    }
}

#[tracing::instrument(skip_all, fields(blur_px = blur_px))]
fn background_pass(image: &DecodedImage, blur_px: f32) -> TextBehindResult<Surface> {
    let sigma = if blur_px.is_finite() {
        blur_px.clamp(0.0, MAX_BLUR_PX)
    } else {
        0.0
    };
    if sigma != blur_px {
        tracing::debug!(requested = blur_px, used = sigma, "background blur clamped");
    }
    let premul = image.to_rgba8_premul();
    let data = if sigma > 0.0 {
        gaussian_blur_premul(&premul, image.width(), image.height(), sigma)?
    } else {
        premul
    };
    Surface::from_premul(image.canvas(), data)
}

#[tracing::instrument(skip_all)]
fn subject_pass(image: &DecodedImage, matte: &AlphaMatte) -> TextBehindResult<Surface> {
    Surface::from_premul(image.canvas(), with_matte_alpha(image.rgba8(), matte)?)
}

#[cfg(test)]
#[path = "../../tests/unit/render/stack.rs"]
mod tests;
