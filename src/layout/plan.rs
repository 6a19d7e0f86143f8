use crate::{
    foundation::{
        config::EngineConfig,
        core::{Orientation, Rect},
        error::{StripError, StripResult},
    },
    session::record::ImageRecord,
};

/// Inputs of the composite layout that come from export options.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutRequest {
    /// Requested strip direction; may be overridden to vertical for oversize strips.
    pub orientation: Orientation,
    /// Uniform scale applied after layout.
    pub global_scale: f64,
    /// Title text; blank titles produce no band.
    pub title: String,
}

impl Default for LayoutRequest {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            global_scale: 1.0,
            title: String::new(),
        }
    }
}

/// Placed rectangle of one photo inside the composite canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Index in the record snapshot.
    pub position: usize,
    /// Width after rotation, before scaling.
    pub visual_width: f64,
    /// Height after rotation, before scaling.
    pub visual_height: f64,
    /// Visual-to-canvas scale, global scale included.
    pub render_scale: f64,
    /// Left edge on the canvas.
    pub offset_x: f64,
    /// Top edge on the canvas.
    pub offset_y: f64,
    /// Width on the canvas.
    pub final_width: f64,
    /// Height on the canvas.
    pub final_height: f64,
}

impl Placement {
    /// Canvas rectangle covered by the photo.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.offset_x,
            self.offset_y,
            self.offset_x + self.final_width,
            self.offset_y + self.final_height,
        )
    }
}

/// Title band at the top of the composite.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleBand {
    /// Trimmed title text.
    pub text: String,
    /// Font size, global scale included.
    pub font_size: f64,
    /// Band height: the font size plus one font size of padding above and below.
    pub height: f64,
}

/// Immutable composite geometry for one export.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutPlan {
    /// Direction the caller asked for.
    pub requested: Orientation,
    /// Direction actually used.
    pub orientation: Orientation,
    /// Common visual height, before global scale.
    pub target_height: f64,
    /// Global scale applied to every length in the plan.
    pub global_scale: f64,
    /// One placement per record, in sequence order.
    pub placements: Vec<Placement>,
    /// Title band, if a title was given.
    pub title: Option<TitleBand>,
    /// Canvas width.
    pub canvas_width: f64,
    /// Canvas height, title band included.
    pub canvas_height: f64,
}

impl LayoutPlan {
    /// Height of the title band, `0.0` without a title.
    pub fn title_band_height(&self) -> f64 {
        self.title.as_ref().map_or(0.0, |t| t.height)
    }

    /// Whole-pixel surface size (fractional edges are truncated, never below one pixel).
    ///
    /// Values within 1e-6 of a whole pixel snap to it first, so float error in
    /// accumulated widths never drops the last column.
    pub fn canvas_size_px(&self) -> (u32, u32) {
        (to_px(self.canvas_width), to_px(self.canvas_height))
    }
}

/// Distance from a whole pixel below which a canvas edge is treated as exact.
pub(crate) const PX_SNAP_EPSILON: f64 = 1e-6;

fn to_px(v: f64) -> u32 {
    let nearest = v.round();
    let snapped = if (v - nearest).abs() < PX_SNAP_EPSILON {
        nearest
    } else {
        v.floor()
    };
    snapped.clamp(1.0, f64::from(u32::MAX)) as u32
}

/// Compute the composite layout for `records` in sequence order.
///
/// Every record is scaled to the first record's visual height. Orientation and the
/// auto-vertical decision are made on unscaled geometry; `global_scale` is applied last.
#[tracing::instrument(skip(records, request, cfg), fields(count = records.len()))]
pub fn plan_composite(
    records: &[ImageRecord],
    request: &LayoutRequest,
    cfg: &EngineConfig,
) -> StripResult<LayoutPlan> {
    let Some(first) = records.first() else {
        return Err(StripError::invalid_input("layout requires at least one record"));
    };
    let g = request.global_scale;
    if !g.is_finite() || g <= 0.0 {
        return Err(StripError::invalid_input(format!(
            "global scale must be finite and > 0, got {g}"
        )));
    }
    for r in records {
        r.ensure_positive_dimensions()?;
    }

    let target_height = f64::from(first.visual_height());

    let mut placements = Vec::with_capacity(records.len());
    for (position, r) in records.iter().enumerate() {
        let (vw, vh) = r.visual_size();
        let (visual_width, visual_height) = (f64::from(vw), f64::from(vh));
        let render_scale = target_height / visual_height;
        placements.push(Placement {
            position,
            visual_width,
            visual_height,
            render_scale,
            offset_x: 0.0,
            offset_y: 0.0,
            final_width: visual_width * render_scale,
            final_height: target_height,
        });
    }

    let title_text = request.title.trim();
    let title = (!title_text.is_empty()).then(|| {
        let font_size = cfg
            .title_font_floor_px
            .max((target_height / cfg.title_font_divisor).floor());
        TitleBand {
            text: title_text.to_string(),
            font_size,
            height: font_size * 3.0,
        }
    });
    let band = title.as_ref().map_or(0.0, |t| t.height);

    let total_width: f64 = placements.iter().map(|p| p.final_width).sum();
    let orientation = match request.orientation {
        Orientation::Horizontal if total_width > cfg.auto_vertical_threshold_px => {
            tracing::info!(
                total_width,
                threshold = cfg.auto_vertical_threshold_px,
                "horizontal strip too wide; stacking vertically"
            );
            Orientation::Vertical
        }
        o => o,
    };

    let (canvas_width, canvas_height) = match orientation {
        Orientation::Horizontal => {
            let mut x = 0.0;
            for p in &mut placements {
                p.offset_x = x;
                p.offset_y = band;
                x += p.final_width;
            }
            (x, target_height + band)
        }
        Orientation::Vertical => {
            let canvas_width = placements
                .iter()
                .map(|p| p.final_width)
                .fold(0.0, f64::max);
            let mut y = band;
            for p in &mut placements {
                p.offset_x = (canvas_width - p.final_width) / 2.0;
                p.offset_y = y;
                y += p.final_height;
            }
            (canvas_width, y)
        }
    };

    let mut plan = LayoutPlan {
        requested: request.orientation,
        orientation,
        target_height,
        global_scale: g,
        placements,
        title,
        canvas_width,
        canvas_height,
    };
    if g != 1.0 {
        apply_global_scale(&mut plan, g);
    }

    tracing::debug!(
        orientation = ?plan.orientation,
        canvas_width = plan.canvas_width,
        canvas_height = plan.canvas_height,
        "composite layout planned"
    );
    Ok(plan)
}

fn apply_global_scale(plan: &mut LayoutPlan, g: f64) {
    for p in &mut plan.placements {
        p.render_scale *= g;
        p.offset_x *= g;
        p.offset_y *= g;
        p.final_width *= g;
        p.final_height *= g;
    }
    if let Some(t) = &mut plan.title {
        t.font_size *= g;
        t.height *= g;
    }
    plan.canvas_width *= g;
    plan.canvas_height *= g;
}

/// Target width cap for animated frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SizeCap {
    /// Keep the first record's visual size.
    #[default]
    Original,
    /// Scale down (never up) so the frame is at most this wide.
    Pixels(u32),
}

/// Animated frame size: the first record's visual size, capped by `cap` preserving aspect.
pub fn frame_size(records: &[ImageRecord], cap: SizeCap) -> StripResult<(u32, u32)> {
    let Some(first) = records.first() else {
        return Err(StripError::invalid_input("frame size requires at least one record"));
    };
    for r in records {
        r.ensure_positive_dimensions()?;
    }
    let (w, h) = first.visual_size();
    match cap {
        SizeCap::Pixels(max_w) if max_w > 0 && w > max_w => {
            let scale = f64::from(max_w) / f64::from(w);
            let scaled_h = (f64::from(h) * scale).round().max(1.0) as u32;
            Ok((max_w, scaled_h))
        }
        _ => Ok((w, h)),
    }
}

/// Where a label badge sits relative to its photo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeAnchor {
    /// Centred horizontally, a margin above the photo's bottom edge (composite).
    BottomCenter,
    /// Fixed inset from the frame's top-left corner (animated sequence).
    TopLeftInset,
}

/// Label badge rectangle and text origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BadgeGeometry {
    /// Semi-transparent background rectangle.
    pub rect: Rect,
    /// Left edge of the text.
    pub text_x: f64,
    /// Vertical centre line of the text.
    pub text_center_y: f64,
    /// Label font size.
    pub font_size: f64,
}

/// Place the badge for a label of width `text_width` (measured at `label_font_px * scale`)
/// over the photo rectangle `photo`.
pub fn label_badge(
    photo: Rect,
    text_width: f64,
    scale: f64,
    anchor: BadgeAnchor,
    cfg: &EngineConfig,
) -> BadgeGeometry {
    let padding = cfg.badge_padding_px * scale;
    let width = text_width + padding * 2.0;
    let height = cfg.badge_height_px * scale;

    let (x, y) = match anchor {
        BadgeAnchor::BottomCenter => (
            photo.x0 + (photo.width() - width) / 2.0,
            photo.y1 - height - cfg.badge_margin_px * scale,
        ),
        BadgeAnchor::TopLeftInset => (
            photo.x0 + cfg.badge_inset_px * scale,
            photo.y0 + cfg.badge_inset_px * scale,
        ),
    };

    BadgeGeometry {
        rect: Rect::new(x, y, x + width, y + height),
        text_x: x + padding,
        text_center_y: y + height / 2.0,
        font_size: cfg.label_font_px * scale,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/plan.rs"]
mod tests;
