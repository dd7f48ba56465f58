use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::mul_div255_u8 as mul_div255;
use crate::render::damage::PixelRect;

pub type PremulRgba8 = [u8; 4];

pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Source-over of two equal-sized premultiplied buffers.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> SceneResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SceneError::backend(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

pub fn fill(dst: &mut [u8], px: PremulRgba8) {
    for d in dst.chunks_exact_mut(4) {
        d.copy_from_slice(&px);
    }
}

/// Copies `rect` from `src` into `dst`; both are `width`-pixel-wide rgba8 buffers of equal size.
pub fn copy_region(dst: &mut [u8], src: &[u8], width: u32, rect: PixelRect) -> SceneResult<()> {
    let stride = width as usize * 4;
    if dst.len() != src.len() || stride == 0 || !dst.len().is_multiple_of(stride) {
        return Err(SceneError::backend(
            "copy_region expects equal-size rgba8 buffers",
        ));
    }
    let rows = dst.len() / stride;
    if rect.x1 > width || rect.y1 as usize > rows || rect.x0 > rect.x1 || rect.y0 > rect.y1 {
        return Err(SceneError::backend(format!(
            "copy_region rect {rect:?} exceeds {width}x{rows} buffer"
        )));
    }
    let (a, b) = (rect.x0 as usize * 4, rect.x1 as usize * 4);
    for y in rect.y0 as usize..rect.y1 as usize {
        let row = y * stride;
        dst[row + a..row + b].copy_from_slice(&src[row + a..row + b]);
    }
    Ok(())
}
