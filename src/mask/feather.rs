use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::core::Canvas;
use crate::foundation::error::{TextBehindError, TextBehindResult};
use crate::mask::signal::SegmentationSignal;

/// Neighborhood half-width used when none is configured.
pub const DEFAULT_FEATHER_RADIUS: u32 = 2;

/// Options for turning a segmentation signal into an [`AlphaMatte`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MaskOpts {
    /// Half-width of the square averaging window applied to soft edge pixels.
    pub feather_radius: u32,
    /// Binarize probability signals at this value; `None` keeps them soft.
    pub probability_threshold: Option<f32>,
}

impl Default for MaskOpts {
    fn default() -> Self {
        Self {
            feather_radius: DEFAULT_FEATHER_RADIUS,
            probability_threshold: None,
        }
    }
}

impl MaskOpts {
    /// Return options with a different feather radius.
    pub fn with_feather_radius(mut self, radius: u32) -> Self {
        self.feather_radius = radius;
        self
    }

    /// Return options with a probability threshold.
    pub fn with_probability_threshold(mut self, threshold: Option<f32>) -> Self {
        self.probability_threshold = threshold;
        self
    }
}

/// Per-pixel subject alpha, same dimensions as the source image. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMatte {
    canvas: Canvas,
    alpha: Arc<Vec<u8>>,
}

impl AlphaMatte {
    /// Wrap an alpha channel without feathering it.
    pub fn from_alpha(width: u32, height: u32, alpha: Vec<u8>) -> TextBehindResult<Self> {
        let canvas = Canvas::new(width, height)?;
        check_len(&alpha, canvas)?;
        Ok(Self {
            canvas,
            alpha: Arc::new(alpha),
        })
    }

    /// Matte dimensions.
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

    /// Alpha values, row-major.
    pub fn alpha(&self) -> &[u8] {
        &self.alpha
    }

    /// Alpha at `(x, y)`, or `None` outside the matte.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        self.alpha
            .get(y as usize * self.canvas.width as usize + x as usize)
            .copied()
    }
}

fn check_len(alpha: &[u8], canvas: Canvas) -> TextBehindResult<()> {
    if alpha.len() != canvas.pixel_count() {
        return Err(TextBehindError::validation(format!(
            "alpha buffer has {} pixels, expected {} for {}x{}",
            alpha.len(),
            canvas.pixel_count(),
            canvas.width,
            canvas.height
        )));
    }
    Ok(())
}

/// Smooth the soft edges of a raw alpha channel.
///
/// Pixels at exactly 0 or 255 are copied through. Every other pixel becomes the rounded mean of
/// the in-bounds pixels of the `(2r+1)²` window centered on it; neighbors outside the image are
/// left out of both the sum and the count. Windows are clipped per row and per column, so a
/// window near the left or right edge never borrows pixels from an adjacent row.
///
/// Averaging always reads the unmodified input, so the result does not depend on visiting order.
#[tracing::instrument(skip(raw_alpha), fields(len = raw_alpha.len()))]
pub fn feather(
    raw_alpha: &[u8],
    width: u32,
    height: u32,
    radius: u32,
) -> TextBehindResult<AlphaMatte> {
    let canvas = Canvas::new(width, height)?;
    check_len(raw_alpha, canvas)?;
    if radius == 0 {
        return AlphaMatte::from_alpha(width, height, raw_alpha.to_vec());
    }

    let w = width as usize;
    let h = height as usize;
    let r = radius as usize;
    let mut out = vec![0u8; raw_alpha.len()];

    out.par_chunks_mut(w).enumerate().for_each(|(y, row_out)| {
        let row_in = &raw_alpha[y * w..(y + 1) * w];
        let y0 = y.saturating_sub(r);
        let y1 = (y + r).min(h - 1);
        for (x, dst) in row_out.iter_mut().enumerate() {
            let a = row_in[x];
            if a == 0 || a == 255 {
                *dst = a;
                continue;
            }
            let x0 = x.saturating_sub(r);
            let x1 = (x + r).min(w - 1);
            let mut sum = 0u64;
            for ny in y0..=y1 {
                let row = &raw_alpha[ny * w + x0..=ny * w + x1];
                sum += row.iter().map(|&v| u64::from(v)).sum::<u64>();
            }
            let count = ((y1 - y0 + 1) * (x1 - x0 + 1)) as u64;
            *dst = ((sum + count / 2) / count) as u8;
        }
    });

    Ok(AlphaMatte {
        canvas,
        alpha: Arc::new(out),
    })
}

/// Convert a segmentation signal and feather it in one step.
pub fn build_matte(
    signal: &SegmentationSignal,
    width: u32,
    height: u32,
    opts: &MaskOpts,
) -> TextBehindResult<AlphaMatte> {
    let raw = signal.to_raw_alpha(width, height, opts.probability_threshold)?;
    feather(&raw, width, height, opts.feather_radius)
}

#[cfg(test)]
#[path = "../../tests/unit/mask/feather.rs"]
mod tests;
