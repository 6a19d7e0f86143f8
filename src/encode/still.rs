use crate::{
    foundation::{
        core::Rgba8,
        error::{StripError, StripResult},
    },
    render::surface::FrameRGBA,
};

/// Encode `frame` as a baseline JPEG at `quality` (1..=100).
///
/// Any transparency is flattened over white.
#[tracing::instrument(skip(frame), fields(width = frame.width, height = frame.height))]
pub fn encode_jpeg(frame: &FrameRGBA, quality: u8) -> StripResult<Vec<u8>> {
    if !(1..=100).contains(&quality) {
        return Err(StripError::encode(format!(
            "jpeg quality {quality} outside 1..=100"
        )));
    }
    let rgb = flatten_to_rgb8(frame, Rgba8::WHITE)?;

    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode(
            &rgb,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| StripError::encode(format!("jpeg: {e}")))?;

    tracing::debug!(bytes = bytes.len(), "jpeg encoded");
    Ok(bytes)
}

/// Composite `frame` over an opaque `bg` and drop the alpha channel.
pub(crate) fn flatten_to_rgb8(frame: &FrameRGBA, bg: Rgba8) -> StripResult<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.width == 0 || frame.height == 0 || frame.data.len() != expected {
        return Err(StripError::encode(format!(
            "frame buffer does not match {}x{}",
            frame.width, frame.height
        )));
    }

    let bg = [u16::from(bg.r), u16::from(bg.g), u16::from(bg.b)];
    let mut out = Vec::with_capacity(expected / 4 * 3);
    for s in frame.data.chunks_exact(4) {
        let a = u16::from(s[3]);
        if a == 255 {
            out.extend_from_slice(&s[..3]);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let src = u16::from(s[c]);
            let v = if frame.premultiplied {
                src + mul_div255(bg[c], inv)
            } else {
                mul_div255(src, a) + mul_div255(bg[c], inv)
            };
            out.push(v.min(255) as u8);
        }
    }
    Ok(out)
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/encode/still.rs"]
mod tests;
