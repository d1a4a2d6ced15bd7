use std::io::Cursor;
use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::{TextBehindError, TextBehindResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// A decoded source image: straight-alpha RGBA8, row-major, tightly packed.
///
/// Pixels are shared behind an `Arc` so editor snapshots and worker threads can hold the same
/// image without copying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    canvas: Canvas,
    rgba8: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap raw straight-alpha RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> TextBehindResult<Self> {
        let canvas = Canvas::new(width, height)?;
        if rgba8.len() != canvas.rgba8_len() {
            return Err(TextBehindError::validation(format!(
                "rgba8 buffer has {} bytes, expected {} for {width}x{height}",
                rgba8.len(),
                canvas.rgba8_len()
            )));
        }
        Ok(Self {
            canvas,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Pixel dimensions.
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

    /// Straight-alpha RGBA8 bytes.
    pub fn rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    /// Copy of the pixels converted to premultiplied RGBA8.
    pub fn to_rgba8_premul(&self) -> Vec<u8> {
        let mut out = self.rgba8.as_ref().clone();
        premultiply_rgba8_in_place(&mut out);
        out
    }
}

/// Decode PNG/JPEG/... bytes into a [`DecodedImage`].
pub fn decode_image(bytes: &[u8]) -> TextBehindResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| TextBehindError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedImage::from_rgba8(width, height, rgba.into_raw())
}

/// Encode straight-alpha RGBA8 pixels as PNG bytes.
pub fn encode_png(width: u32, height: u32, rgba8: &[u8]) -> TextBehindResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut buf),
        rgba8,
        width,
        height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| TextBehindError::Other(anyhow::Error::new(e).context("encode png")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
