use crate::{
    assets::text::TextShaper,
    foundation::{
        config::EngineConfig,
        core::{Affine, Point, Rect, Rgba8, Rotation, Vec2},
        error::StripResult,
    },
    layout::plan::{BadgeAnchor, LayoutPlan, label_badge},
    session::record::ImageRecord,
};

/// Horizontal anchoring of a text op's `x` coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    /// `x` is the left edge.
    Start,
    /// `x` is the centre.
    Center,
}

/// One operation against a raster surface.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Reset every pixel to transparent.
    Clear,
    /// Fill an axis-aligned rectangle.
    FillRect {
        /// Surface rectangle.
        rect: Rect,
        /// Fill color.
        color: Rgba8,
    },
    /// Draw a prepared source raster.
    Image {
        /// Index passed to [`crate::RasterSurface::prepare_source`].
        source: usize,
        /// Maps source pixel space onto the surface.
        transform: Affine,
    },
    /// Draw a single line of text, vertically centred on `center_y`.
    Text {
        /// Text to draw.
        text: String,
        /// Font size in surface pixels.
        font_size: f64,
        /// Anchor x, interpreted through `align`.
        x: f64,
        /// Vertical centre line.
        center_y: f64,
        /// Horizontal anchoring.
        align: TextAlign,
        /// Text color.
        color: Rgba8,
    },
}

/// Ordered draw operations for one surface of `width` x `height` pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawList {
    /// Surface width.
    pub width: u32,
    /// Surface height.
    pub height: u32,
    /// Operations in paint order.
    pub ops: Vec<DrawOp>,
}

/// Affine drawing a `source_size` raster into a `box_w` x `box_h` visual box centred on
/// `center`, rotated and then mirrored.
///
/// For quarter turns the raster is drawn at `box_h` x `box_w` so it fills the box once
/// rotated.
pub fn image_transform(
    center: Point,
    box_w: f64,
    box_h: f64,
    source_size: (u32, u32),
    rotation: Rotation,
    flipped: bool,
) -> Affine {
    let (draw_w, draw_h) = if rotation.swaps_axes() {
        (box_h, box_w)
    } else {
        (box_w, box_h)
    };
    let (src_w, src_h) = (f64::from(source_size.0), f64::from(source_size.1));

    let mut t = Affine::translate(center.to_vec2()) * Affine::rotate(rotation.radians());
    if flipped {
        t = t * Affine::scale_non_uniform(-1.0, 1.0);
    }
    t * Affine::translate(Vec2::new(-draw_w / 2.0, -draw_h / 2.0))
        * Affine::scale_non_uniform(draw_w / src_w, draw_h / src_h)
}

fn image_op(source: usize, record: &ImageRecord, bounds: Rect) -> DrawOp {
    DrawOp::Image {
        source,
        transform: image_transform(
            bounds.center(),
            bounds.width(),
            bounds.height(),
            (record.pixel_width(), record.pixel_height()),
            record.rotation(),
            record.flipped(),
        ),
    }
}

fn badge_ops(
    record: &ImageRecord,
    bounds: Rect,
    scale: f64,
    anchor: BadgeAnchor,
    text: &mut TextShaper,
    cfg: &EngineConfig,
) -> StripResult<[DrawOp; 2]> {
    let label = record.label();
    let text_width = text.measure(label, cfg.label_font_px * scale)?;
    let badge = label_badge(bounds, text_width, scale, anchor, cfg);
    Ok([
        DrawOp::FillRect {
            rect: badge.rect,
            color: Rgba8::black_with_opacity(cfg.badge_opacity),
        },
        DrawOp::Text {
            text: label.to_string(),
            font_size: badge.font_size,
            x: badge.text_x,
            center_y: badge.text_center_y,
            align: TextAlign::Start,
            color: Rgba8::WHITE,
        },
    ])
}

/// Draw list for one animated frame: the record stretched over the whole frame, with its
/// badge at the top-left inset.
pub fn compile_frame(
    source: usize,
    record: &ImageRecord,
    frame_size: (u32, u32),
    text: &mut TextShaper,
    cfg: &EngineConfig,
) -> StripResult<DrawList> {
    let frame = Rect::new(0.0, 0.0, f64::from(frame_size.0), f64::from(frame_size.1));
    let mut ops = Vec::with_capacity(4);
    ops.push(DrawOp::Clear);
    ops.push(image_op(source, record, frame));
    ops.extend(badge_ops(
        record,
        frame,
        1.0,
        BadgeAnchor::TopLeftInset,
        text,
        cfg,
    )?);
    Ok(DrawList {
        width: frame_size.0,
        height: frame_size.1,
        ops,
    })
}

/// Draw list for the composite: white background, optional title, then each record in its
/// placed rectangle with a bottom-centred badge.
pub fn compile_composite(
    records: &[ImageRecord],
    plan: &LayoutPlan,
    text: &mut TextShaper,
    cfg: &EngineConfig,
) -> StripResult<DrawList> {
    let (width, height) = plan.canvas_size_px();
    let mut ops = Vec::with_capacity(2 + records.len() * 3);

    ops.push(DrawOp::FillRect {
        rect: Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
        color: Rgba8::WHITE,
    });

    if let Some(title) = &plan.title {
        ops.push(DrawOp::Text {
            text: title.text.clone(),
            font_size: title.font_size,
            x: plan.canvas_width / 2.0,
            center_y: title.height / 2.0,
            align: TextAlign::Center,
            color: Rgba8::BLACK,
        });
    }

    for (record, placement) in records.iter().zip(&plan.placements) {
        let bounds = placement.rect();
        ops.push(image_op(placement.position, record, bounds));
        ops.extend(badge_ops(
            record,
            bounds,
            plan.global_scale,
            BadgeAnchor::BottomCenter,
            text,
            cfg,
        )?);
    }

    Ok(DrawList { width, height, ops })
}

#[cfg(test)]
#[path = "../../tests/unit/render/draw.rs"]
mod tests;
