use std::path::Path;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::foundation::error::{TextBehindError, TextBehindResult};
use crate::mask::signal::SegmentationSignal;

/// Produces a per-pixel subject signal for an image, at the image's resolution.
///
/// Implementations may be slow; the editor can run them on a worker thread, hence `Send + Sync`.
pub trait Segmenter: Send + Sync {
    /// Segment `image`.
    fn segment(&self, image: &DecodedImage) -> TextBehindResult<SegmentationSignal>;
}

impl<F> Segmenter for F
where
    F: Fn(&DecodedImage) -> TextBehindResult<SegmentationSignal> + Send + Sync,
{
    fn segment(&self, image: &DecodedImage) -> TextBehindResult<SegmentationSignal> {
        self(image)
    }
}

/// Segmenter that reads a precomputed mask image.
///
/// Uses the mask's alpha channel when any pixel is non-opaque, otherwise its luminance.
#[derive(Clone, Debug)]
pub struct MaskImageSegmenter {
    mask: DecodedImage,
}

impl MaskImageSegmenter {
    /// Wrap an already decoded mask.
    pub fn new(mask: DecodedImage) -> Self {
        Self { mask }
    }

    /// Decode a mask from encoded bytes.
    pub fn from_bytes(bytes: &[u8]) -> TextBehindResult<Self> {
        Ok(Self::new(decode_image(bytes)?))
    }

    /// Read and decode a mask file.
    pub fn from_path(path: &Path) -> TextBehindResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            TextBehindError::segmentation(format!("read mask '{}': {e}", path.display()))
        })?;
        Self::from_bytes(&bytes)
    }

    fn mask_alpha(&self) -> Vec<u8> {
        let px = self.mask.rgba8().chunks_exact(4);
        if px.clone().any(|p| p[3] != 255) {
            return px.map(|p| p[3]).collect();
        }
        px.map(|p| {
            // Rec. 601 luma in fixed point.
            let y = 299 * u32::from(p[0]) + 587 * u32::from(p[1]) + 114 * u32::from(p[2]);
            ((y + 500) / 1000) as u8
        })
        .collect()
    }
}

impl Segmenter for MaskImageSegmenter {
    #[tracing::instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn segment(&self, image: &DecodedImage) -> TextBehindResult<SegmentationSignal> {
        if self.mask.canvas() != image.canvas() {
            return Err(TextBehindError::segmentation(format!(
                "mask is {}x{} but image is {}x{}",
                self.mask.width(),
                self.mask.height(),
                image.width(),
                image.height()
            )));
        }
        Ok(SegmentationSignal::Alpha(self.mask_alpha()))
    }
}

#[cfg(test)]
#[path = "../tests/unit/segment/segment.rs"]
mod tests;
