pub(crate) mod sequence;
pub(crate) mod still;

use crate::{
    foundation::error::{StripError, StripResult},
    render::surface::FrameRGBA,
};

/// Straight-alpha RGBA8 bytes of `frame`, validated against its dimensions.
pub(crate) fn straight_rgba8(frame: &FrameRGBA) -> StripResult<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.width == 0 || frame.height == 0 || frame.data.len() != expected {
        return Err(StripError::encode(format!(
            "frame buffer does not match {}x{}",
            frame.width, frame.height
        )));
    }
    if frame.premultiplied {
        Ok(crate::assets::decode::unpremultiply_rgba8(&frame.data))
    } else {
        Ok(frame.data.clone())
    }
}
