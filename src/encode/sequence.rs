use crate::{
    encode::straight_rgba8,
    foundation::error::{StripError, StripResult},
    render::surface::FrameRGBA,
};

/// One frame of an animated sequence.
#[derive(Clone, Debug)]
pub struct SequenceFrame {
    /// Rendered pixels.
    pub frame: FrameRGBA,
    /// Display time in milliseconds.
    pub delay_ms: u32,
}

/// Output parameters handed to a [`SequenceEncoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceTarget {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Encoder-specific quality/speed hint.
    pub quality_hint: u8,
}

/// Turns an ordered list of frames into one animated file.
///
/// `progress` receives fractions in `[0, 1]`; implementations may report as often as they like.
pub trait SequenceEncoder {
    /// Encode `frames` in order and return the file bytes.
    fn encode(
        &mut self,
        frames: &[SequenceFrame],
        target: &SequenceTarget,
        progress: &mut dyn FnMut(f64),
    ) -> StripResult<Vec<u8>>;
}

/// Animated GIF encoder built on the `image` crate, looping forever.
#[derive(Clone, Copy, Debug, Default)]
pub struct GifSequenceEncoder;

impl GifSequenceEncoder {
    /// New GIF encoder.
    pub fn new() -> Self {
        Self
    }
}

impl SequenceEncoder for GifSequenceEncoder {
    #[tracing::instrument(
        skip_all,
        fields(frames = frames.len(), width = target.width, height = target.height)
    )]
    fn encode(
        &mut self,
        frames: &[SequenceFrame],
        target: &SequenceTarget,
        progress: &mut dyn FnMut(f64),
    ) -> StripResult<Vec<u8>> {
        if frames.is_empty() {
            return Err(StripError::encode("no frames to encode"));
        }

        let speed = i32::from(target.quality_hint.clamp(1, 30));
        let mut bytes = Vec::new();
        {
            let mut encoder = image::codecs::gif::GifEncoder::new_with_speed(&mut bytes, speed);
            encoder
                .set_repeat(image::codecs::gif::Repeat::Infinite)
                .map_err(|e| StripError::encode(format!("gif repeat: {e}")))?;

            let total = frames.len();
            for (idx, seq) in frames.iter().enumerate() {
                if (seq.frame.width, seq.frame.height) != (target.width, target.height) {
                    return Err(StripError::encode(format!(
                        "frame {idx} is {}x{}, expected {}x{}",
                        seq.frame.width, seq.frame.height, target.width, target.height
                    )));
                }
                let rgba = straight_rgba8(&seq.frame)?;
                let buffer = image::RgbaImage::from_raw(target.width, target.height, rgba)
                    .ok_or_else(|| StripError::encode("frame buffer size mismatch"))?;
                let delay = image::Delay::from_numer_denom_ms(seq.delay_ms, 1);
                encoder
                    .encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))
                    .map_err(|e| StripError::encode(format!("gif frame {idx}: {e}")))?;
                progress((idx + 1) as f64 / total as f64);
            }
        }

        tracing::debug!(bytes = bytes.len(), "gif encoded");
        Ok(bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sequence.rs"]
mod tests;
