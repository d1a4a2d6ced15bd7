use crate::foundation::core::Canvas;
use crate::foundation::error::{TextBehindError, TextBehindResult};

/// Axis-aligned pixel rectangle on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelRect {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl PixelRect {
    /// Grow by `by` pixels on every side, clipped to `canvas`.
    pub(crate) fn padded(self, by: u32, canvas: Canvas) -> Self {
        let x0 = self.x.saturating_sub(by);
        let y0 = self.y.saturating_sub(by);
        let x1 = (self.x + self.width).saturating_add(by).min(canvas.width);
        let y1 = (self.y + self.height).saturating_add(by).min(canvas.height);
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

/// One premultiplied RGBA8 render target, owned by a single render call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Surface {
    canvas: Canvas,
    data: Vec<u8>,
}

impl Surface {
    /// Acquire a transparent target of `canvas` size.
    ///
    /// Fails when the size cannot be rasterized (`vello_cpu` addresses pixmaps with `u16`).
    pub(crate) fn acquire(canvas: Canvas) -> TextBehindResult<Self> {
        check_rasterizable(canvas)?;
        Ok(Self {
            canvas,
            data: vec![0u8; canvas.rgba8_len()],
        })
    }

    /// Acquire a target holding `data` (premultiplied RGBA8).
    pub(crate) fn from_premul(canvas: Canvas, data: Vec<u8>) -> TextBehindResult<Self> {
        check_rasterizable(canvas)?;
        if data.len() != canvas.rgba8_len() {
            return Err(TextBehindError::render("surface byte len mismatch"));
        }
        Ok(Self { canvas, data })
    }

    pub(crate) fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn clear(&mut self) {
        self.data.fill(0);
    }

    pub(crate) fn width_u16(&self) -> u16 {
        self.canvas.width as u16
    }

    pub(crate) fn height_u16(&self) -> u16 {
        self.canvas.height as u16
    }

    /// Smallest rectangle holding every pixel with non-zero alpha; `None` when fully transparent.
    pub(crate) fn opaque_bounds(&self) -> Option<PixelRect> {
        let row_len = self.canvas.width as usize * 4;
        let mut bounds: Option<(usize, usize, usize, usize)> = None;
        for (y, row) in self.data.chunks_exact(row_len).enumerate() {
            let mut xs = row
                .chunks_exact(4)
                .enumerate()
                .filter(|(_, px)| px[3] != 0)
                .map(|(x, _)| x);
            let Some(first) = xs.next() else {
                continue;
            };
            let last = xs.last().unwrap_or(first);
            bounds = Some(match bounds {
                None => (first, y, last, y),
                Some((x0, y0, x1, _)) => (x0.min(first), y0, x1.max(last), y),
            });
        }
        bounds.map(|(x0, y0, x1, y1)| PixelRect {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0 + 1) as u32,
            height: (y1 - y0 + 1) as u32,
        })
    }

    /// Copy of the pixels inside `rect`.
    pub(crate) fn crop(&self, rect: PixelRect) -> TextBehindResult<Self> {
        if rect.x + rect.width > self.canvas.width || rect.y + rect.height > self.canvas.height {
            return Err(TextBehindError::render("crop rectangle outside the surface"));
        }
        let canvas = Canvas::new(rect.width, rect.height)?;
        let stride = self.canvas.width as usize * 4;
        let row_len = rect.width as usize * 4;
        let mut data = Vec::with_capacity(canvas.rgba8_len());
        for y in rect.y..rect.y + rect.height {
            let start = y as usize * stride + rect.x as usize * 4;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Self::from_premul(canvas, data)
    }

    /// Fresh transparent `vello_cpu` pixmap of the same size.
    pub(crate) fn blank_pixmap(&self) -> vello_cpu::Pixmap {
        vello_cpu::Pixmap::new(self.width_u16(), self.height_u16())
    }
}

fn check_rasterizable(canvas: Canvas) -> TextBehindResult<()> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(TextBehindError::render("render target must be non-empty"));
    }
    if canvas.width > u32::from(u16::MAX) || canvas.height > u32::from(u16::MAX) {
        return Err(TextBehindError::render(format!(
            "render target {}x{} exceeds {} px per side",
            canvas.width,
            canvas.height,
            u16::MAX
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
