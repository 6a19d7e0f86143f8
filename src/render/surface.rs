use crate::{
    assets::PreparedImage,
    foundation::error::{StripError, StripResult},
    render::draw::{DrawList, DrawOp},
};

/// A finished raster.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 bytes.
    pub data: Vec<u8>,
    /// `true` when `data` is premultiplied by alpha.
    pub premultiplied: bool,
}

/// A 2D raster target driven by [`DrawOp`]s.
///
/// Sources are prepared once per export and referenced by index from image ops; a surface is
/// reused for every draw list of the export, one list at a time.
pub trait RasterSurface {
    /// Make `image` available to [`DrawOp::Image`] ops as `index`.
    fn prepare_source(&mut self, index: usize, image: &PreparedImage) -> StripResult<()>;

    /// Drop all prepared sources.
    fn release_sources(&mut self);

    /// Start a fresh, fully transparent surface of the given size.
    fn begin(&mut self, width: u32, height: u32) -> StripResult<()>;

    /// Apply one operation.
    fn draw(&mut self, op: &DrawOp) -> StripResult<()>;

    /// Rasterize everything drawn since [`RasterSurface::begin`].
    fn finish(&mut self) -> StripResult<FrameRGBA>;
}

/// Run `list` against `surface`, calling `on_op(done, total)` after each operation.
pub fn execute_draw_list<S: RasterSurface + ?Sized>(
    surface: &mut S,
    list: &DrawList,
    mut on_op: impl FnMut(usize, usize),
) -> StripResult<FrameRGBA> {
    if list.width == 0 || list.height == 0 {
        return Err(StripError::invalid_geometry(format!(
            "cannot draw on a {}x{} surface",
            list.width, list.height
        )));
    }

    surface.begin(list.width, list.height)?;
    let total = list.ops.len();
    for (idx, op) in list.ops.iter().enumerate() {
        surface.draw(op)?;
        on_op(idx + 1, total);
    }
    surface.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
