use std::sync::Arc;

use anyhow::Context;

use crate::{
    assets::PreparedImage,
    foundation::error::{StripError, StripResult},
};

/// Encoded raster formats accepted as sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// JPEG / JFIF.
    Jpeg,
    /// PNG.
    Png,
    /// WebP.
    WebP,
}

impl SourceFormat {
    fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::WebP => image::ImageFormat::WebP,
        }
    }
}

/// Identify an accepted source format from its magic bytes.
pub fn sniff_format(bytes: &[u8]) -> StripResult<SourceFormat> {
    let format = image::guess_format(bytes)
        .map_err(|_| StripError::invalid_input("unrecognized image format"))?;
    match format {
        image::ImageFormat::Jpeg => Ok(SourceFormat::Jpeg),
        image::ImageFormat::Png => Ok(SourceFormat::Png),
        image::ImageFormat::WebP => Ok(SourceFormat::WebP),
        other => Err(StripError::invalid_input(format!(
            "unaccepted image format {other:?}; expected JPEG, PNG or WebP"
        ))),
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> StripResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    prepare_rgba(dyn_img)
}

/// Decode bytes already sniffed as `format`.
pub fn decode_image_as(bytes: &[u8], format: SourceFormat) -> StripResult<PreparedImage> {
    let dyn_img = image::load_from_memory_with_format(bytes, format.image_format())
        .with_context(|| format!("decode {format:?} image"))?;
    prepare_rgba(dyn_img)
}

fn prepare_rgba(dyn_img: image::DynamicImage) -> StripResult<PreparedImage> {
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(StripError::invalid_geometry(format!(
            "decoded image has degenerate size {width}x{height}"
        )));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Convert premultiplied RGBA8 back to straight alpha for encoders.
pub fn unpremultiply_rgba8(premul: &[u8]) -> Vec<u8> {
    let mut out = premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
