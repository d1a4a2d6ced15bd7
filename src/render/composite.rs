use crate::foundation::error::{TextBehindError, TextBehindResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8, opacity_to_u8};
use crate::mask::feather::AlphaMatte;
use crate::render::surface::Surface;

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over of one premultiplied pixel, with `src` scaled by `opacity`.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = u16::from(opacity_to_u8(opacity));
    if op == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> TextBehindResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TextBehindError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Source-over `src` onto `dst`, with `src`'s top-left corner at `(x, y)`.
pub(crate) fn over_at(dst: &mut Surface, src: &Surface, x: u32, y: u32) -> TextBehindResult<()> {
    let (dc, sc) = (dst.canvas(), src.canvas());
    if x + sc.width > dc.width || y + sc.height > dc.height {
        return Err(TextBehindError::render("composite region outside the target"));
    }
    let stride = dc.width as usize * 4;
    let row_len = sc.width as usize * 4;
    let dst_data = dst.data_mut();
    for (row, src_row) in src.data().chunks_exact(row_len).enumerate() {
        let start = (y as usize + row) * stride + x as usize * 4;
        over_in_place(&mut dst_data[start..start + row_len], src_row, 1.0)?;
    }
    Ok(())
}

/// Straight-alpha `rgba8` with every alpha replaced by `matte`, written out premultiplied.
///
/// Color channels are taken unchanged from the source.
pub(crate) fn with_matte_alpha(rgba8: &[u8], matte: &AlphaMatte) -> TextBehindResult<Vec<u8>> {
    let alpha = matte.alpha();
    if rgba8.len() != alpha.len().saturating_mul(4) {
        return Err(TextBehindError::render(format!(
            "matte is {}x{} but image has {} pixels",
            matte.width(),
            matte.height(),
            rgba8.len() / 4
        )));
    }
    let mut out = Vec::with_capacity(rgba8.len());
    for (px, &a) in rgba8.chunks_exact(4).zip(alpha.iter()) {
        let a16 = u16::from(a);
        out.extend_from_slice(&[
            mul_div255_u8(u16::from(px[0]), a16),
            mul_div255_u8(u16::from(px[1]), a16),
            mul_div255_u8(u16::from(px[2]), a16),
            a,
        ]);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
