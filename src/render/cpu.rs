use std::sync::Arc;

use crate::{
    assets::{PreparedImage, text::TextShaper},
    foundation::{
        core::{Affine, Rect, Rgba8, Vec2},
        error::{StripError, StripResult},
    },
    render::{
        draw::{DrawOp, TextAlign},
        surface::{FrameRGBA, RasterSurface},
    },
};

/// CPU raster surface backed by `vello_cpu`, with Parley-shaped text.
pub struct CpuSurface {
    text: TextShaper,
    font: Option<vello_cpu::peniko::FontData>,
    sources: Vec<Option<SourcePaint>>,
    target: Option<CpuTarget>,
    warned_missing_font: bool,
}

#[derive(Clone)]
struct SourcePaint {
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
}

struct CpuTarget {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("text", &self.text)
            .field(
                "sources",
                &self.sources.iter().filter(|s| s.is_some()).count(),
            )
            .field(
                "target",
                &self.target.as_ref().map(|t| (t.width, t.height)),
            )
            .finish()
    }
}

impl CpuSurface {
    /// Surface that shapes text with `text`.
    pub fn new(text: TextShaper) -> Self {
        let font = text.font_bytes().map(|bytes| {
            vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
                0,
            )
        });
        Self {
            text,
            font,
            sources: Vec::new(),
            target: None,
            warned_missing_font: false,
        }
    }

    /// Text shaper shared with draw-list compilation.
    pub fn text_mut(&mut self) -> &mut TextShaper {
        &mut self.text
    }

    fn target_mut(&mut self) -> StripResult<&mut CpuTarget> {
        self.target
            .as_mut()
            .ok_or_else(|| StripError::render("draw called before begin"))
    }

    fn draw_text(
        &mut self,
        text: &str,
        font_size: f64,
        x: f64,
        center_y: f64,
        align: TextAlign,
        color: Rgba8,
    ) -> StripResult<()> {
        let Some(layout) = self.text.layout(text, font_size, color)? else {
            if !self.warned_missing_font {
                tracing::warn!("no font configured; labels and titles are drawn without text");
                self.warned_missing_font = true;
            }
            return Ok(());
        };
        let font = self
            .font
            .as_ref()
            .ok_or_else(|| StripError::render("text layout without font data"))?;
        let target = self
            .target
            .as_mut()
            .ok_or_else(|| StripError::render("draw called before begin"))?;

        let width = f64::from(layout.width());
        let left = match align {
            TextAlign::Start => x,
            TextAlign::Center => x - width / 2.0,
        };
        let top = center_y - f64::from(layout.height()) / 2.0;
        target
            .ctx
            .set_transform(affine_to_cpu(Affine::translate(Vec2::new(left, top))));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                target.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                target
                    .ctx
                    .glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

impl RasterSurface for CpuSurface {
    fn prepare_source(&mut self, index: usize, image: &PreparedImage) -> StripResult<()> {
        let pixmap =
            image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        if self.sources.len() <= index {
            self.sources.resize_with(index + 1, || None);
        }
        self.sources[index] = Some(SourcePaint {
            paint,
            width: image.width,
            height: image.height,
        });
        Ok(())
    }

    fn release_sources(&mut self) {
        self.sources.clear();
    }

    fn begin(&mut self, width: u32, height: u32) -> StripResult<()> {
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| StripError::render(format!("surface width {width} exceeds u16")))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| StripError::render(format!("surface height {height} exceeds u16")))?;

        let mut ctx = match self.target.take() {
            Some(t) if t.width == width_u16 && t.height == height_u16 => t.ctx,
            _ => vello_cpu::RenderContext::new(width_u16, height_u16),
        };
        ctx.reset();
        self.target = Some(CpuTarget {
            width: width_u16,
            height: height_u16,
            ctx,
        });
        Ok(())
    }

    fn draw(&mut self, op: &DrawOp) -> StripResult<()> {
        match op {
            DrawOp::Clear => {
                self.target_mut()?.ctx.reset();
                Ok(())
            }
            DrawOp::FillRect { rect, color } => {
                let ctx = &mut self.target_mut()?.ctx;
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    color.r, color.g, color.b, color.a,
                ));
                ctx.fill_rect(&rect_to_cpu(*rect));
                Ok(())
            }
            DrawOp::Image { source, transform } => {
                let src = self
                    .sources
                    .get(*source)
                    .and_then(|s| s.clone())
                    .ok_or_else(|| {
                        StripError::render(format!("image source {source} was not prepared"))
                    })?;
                let ctx = &mut self.target_mut()?.ctx;
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_transform(affine_to_cpu(*transform));
                ctx.set_paint(src.paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(src.width),
                    f64::from(src.height),
                ));
                Ok(())
            }
            DrawOp::Text {
                text,
                font_size,
                x,
                center_y,
                align,
                color,
            } => self.draw_text(text, *font_size, *x, *center_y, *align, *color),
        }
    }

    fn finish(&mut self) -> StripResult<FrameRGBA> {
        let target = self.target_mut()?;
        let mut pixmap = vello_cpu::Pixmap::new(target.width, target.height);
        target.ctx.flush();
        target.ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: u32::from(target.width),
            height: u32::from(target.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StripResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StripError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StripError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StripError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
