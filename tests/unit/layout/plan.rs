use std::sync::Arc;

use super::*;
use crate::{assets::PreparedImage, foundation::core::Rotation};

fn rec(w: u32, h: u32) -> ImageRecord {
    ImageRecord::new(
        "p.jpg",
        Arc::new(PreparedImage {
            width: w,
            height: h,
            rgba8_premul: Arc::new(Vec::new()),
        }),
    )
}

fn rotated(w: u32, h: u32, rotation: Rotation) -> ImageRecord {
    let mut r = rec(w, h);
    r.set_rotation(rotation);
    r
}

fn horizontal(scale: f64) -> LayoutRequest {
    LayoutRequest {
        global_scale: scale,
        ..LayoutRequest::default()
    }
}

#[test]
fn single_image_without_title_fills_canvas() {
    let cfg = EngineConfig::default();
    let plan = plan_composite(&[rec(1000, 2000)], &horizontal(1.0), &cfg).unwrap();
    assert_eq!(plan.canvas_width, 1000.0);
    assert_eq!(plan.canvas_height, 2000.0);
    assert_eq!(plan.canvas_size_px(), (1000, 2000));
    assert!(plan.title.is_none());
    assert_eq!(plan.title_band_height(), 0.0);

    let p = plan.placements[0];
    let badge = label_badge(p.rect(), 200.0, 1.0, BadgeAnchor::BottomCenter, &cfg);
    assert_eq!(badge.rect.width(), 240.0);
    assert_eq!(badge.rect.height(), 60.0);
    assert_eq!(badge.rect.center().x, 500.0);
    assert_eq!(badge.rect.y1, 2000.0 - 20.0);
}

#[test]
fn quarter_turned_record_matches_landscape_neighbour() {
    let cfg = EngineConfig::default();
    let records = [rec(800, 600), rotated(600, 800, Rotation::Deg90)];
    let plan = plan_composite(&records, &horizontal(1.0), &cfg).unwrap();

    assert_eq!(plan.orientation, Orientation::Horizontal);
    assert_eq!(plan.canvas_width, 1600.0);
    assert_eq!(plan.canvas_height, 600.0);
    for p in &plan.placements {
        assert_eq!(p.visual_height, 600.0);
        assert_eq!(p.render_scale, 1.0);
    }
    assert_eq!(plan.placements[1].offset_x, 800.0);
}

#[test]
fn vertical_layout_with_title_stacks_under_band() {
    let cfg = EngineConfig::default();
    let records = [rec(500, 400), rec(500, 400), rec(500, 400)];
    let request = LayoutRequest {
        orientation: Orientation::Vertical,
        global_scale: 1.0,
        title: "Jan-Jun".to_string(),
    };
    let plan = plan_composite(&records, &request, &cfg).unwrap();

    let title = plan.title.as_ref().unwrap();
    assert_eq!(title.font_size, 80.0);
    assert_eq!(title.height, 240.0);
    assert_eq!(plan.canvas_width, 500.0);
    assert_eq!(plan.canvas_height, 1440.0);
    let ys = plan.placements.iter().map(|p| p.offset_y).collect::<Vec<_>>();
    assert_eq!(ys, [240.0, 640.0, 1040.0]);
}

#[test]
fn vertical_layout_centres_narrower_records() {
    let cfg = EngineConfig::default();
    let records = [rec(400, 200), rec(100, 100)];
    let request = LayoutRequest {
        orientation: Orientation::Vertical,
        ..LayoutRequest::default()
    };
    let plan = plan_composite(&records, &request, &cfg).unwrap();
    assert_eq!(plan.canvas_width, 400.0);
    assert_eq!(plan.placements[1].final_width, 200.0);
    assert_eq!(plan.placements[1].offset_x, 100.0);
    assert_eq!(plan.canvas_height, 400.0);
}

#[test]
fn title_font_grows_with_tall_photos() {
    let cfg = EngineConfig::default();
    let request = LayoutRequest {
        title: "  Progress  ".to_string(),
        ..LayoutRequest::default()
    };
    let plan = plan_composite(&[rec(3000, 3000)], &request, &cfg).unwrap();
    let title = plan.title.unwrap();
    assert_eq!(title.text, "Progress");
    assert_eq!(title.font_size, 200.0);
    assert_eq!(title.height, 600.0);
}

#[test]
fn blank_title_has_no_band() {
    let cfg = EngineConfig::default();
    let request = LayoutRequest {
        title: "   ".to_string(),
        ..LayoutRequest::default()
    };
    let plan = plan_composite(&[rec(10, 10)], &request, &cfg).unwrap();
    assert!(plan.title.is_none());
}

#[test]
fn horizontal_heights_equal_target_times_scale() {
    let cfg = EngineConfig::default();
    let records = [rec(300, 200), rec(100, 400), rec(640, 480), rec(50, 25)];
    for scale in [0.5, 1.0, 2.0] {
        let plan = plan_composite(&records, &horizontal(scale), &cfg).unwrap();
        for p in &plan.placements {
            assert_eq!(p.final_height, 200.0 * scale);
        }
    }
}

#[test]
fn widths_accumulate_exactly_without_overlap() {
    let cfg = EngineConfig::default();
    let records = [rec(300, 200), rec(100, 400), rec(400, 100), rec(200, 200)];
    let plan = plan_composite(&records, &horizontal(1.0), &cfg).unwrap();

    let sum: f64 = plan.placements.iter().map(|p| p.final_width).sum();
    assert_eq!(sum, plan.canvas_width);
    assert_eq!(plan.canvas_width, 300.0 + 50.0 + 800.0 + 200.0);

    for pair in plan.placements.windows(2) {
        assert!(pair[1].offset_x > pair[0].offset_x);
        assert_eq!(pair[0].offset_x + pair[0].final_width, pair[1].offset_x);
    }
}

#[test]
fn oversize_horizontal_request_becomes_vertical() {
    let cfg = EngineConfig::default();
    let records = [rec(3000, 1000), rec(3000, 1000), rec(3000, 1000)];
    let plan = plan_composite(&records, &horizontal(1.0), &cfg).unwrap();
    assert_eq!(plan.requested, Orientation::Horizontal);
    assert_eq!(plan.orientation, Orientation::Vertical);
    assert_eq!(plan.canvas_width, 3000.0);
    assert_eq!(plan.canvas_height, 3000.0);
}

#[test]
fn threshold_is_judged_before_global_scale() {
    let cfg = EngineConfig::default();
    let records = [rec(3000, 1000), rec(3000, 1000)];
    let plan = plan_composite(&records, &horizontal(2.0), &cfg).unwrap();
    assert_eq!(plan.orientation, Orientation::Horizontal);
    assert_eq!(plan.canvas_width, 12000.0);
}

#[test]
fn configured_threshold_is_respected() {
    let cfg = EngineConfig {
        auto_vertical_threshold_px: 500.0,
        ..EngineConfig::default()
    };
    let plan = plan_composite(&[rec(300, 100), rec(300, 100)], &horizontal(1.0), &cfg).unwrap();
    assert_eq!(plan.orientation, Orientation::Vertical);
}

#[test]
fn global_scale_scales_title_and_offsets() {
    let cfg = EngineConfig::default();
    let request = LayoutRequest {
        orientation: Orientation::Horizontal,
        global_scale: 0.5,
        title: "T".to_string(),
    };
    let plan = plan_composite(&[rec(400, 300), rec(400, 300)], &request, &cfg).unwrap();
    let title = plan.title.as_ref().unwrap();
    assert_eq!(title.font_size, 40.0);
    assert_eq!(title.height, 120.0);
    assert_eq!(plan.placements[1].offset_x, 200.0);
    assert_eq!(plan.placements[1].offset_y, 120.0);
    assert_eq!(plan.canvas_width, 400.0);
    assert_eq!(plan.canvas_height, 270.0);
}

#[test]
fn degenerate_inputs_are_rejected() {
    let cfg = EngineConfig::default();
    assert!(matches!(
        plan_composite(&[rec(10, 10), rec(0, 5)], &horizontal(1.0), &cfg),
        Err(StripError::InvalidGeometry(_))
    ));
    assert!(matches!(
        plan_composite(&[], &horizontal(1.0), &cfg),
        Err(StripError::InvalidInput(_))
    ));
    assert!(matches!(
        plan_composite(&[rec(1, 1)], &horizontal(0.0), &cfg),
        Err(StripError::InvalidInput(_))
    ));
}

#[test]
fn frame_size_only_scales_down() {
    let records = [rec(1200, 900)];
    assert_eq!(frame_size(&records, SizeCap::Original).unwrap(), (1200, 900));
    assert_eq!(frame_size(&records, SizeCap::Pixels(600)).unwrap(), (600, 450));
    assert_eq!(
        frame_size(&records, SizeCap::Pixels(2000)).unwrap(),
        (1200, 900)
    );
}

#[test]
fn frame_size_uses_visual_dimensions_of_first_record() {
    let records = [rotated(1200, 900, Rotation::Deg270), rec(10, 10)];
    assert_eq!(frame_size(&records, SizeCap::Original).unwrap(), (900, 1200));
    assert_eq!(frame_size(&records, SizeCap::Pixels(450)).unwrap(), (450, 600));
}

#[test]
fn top_left_badge_ignores_photo_size() {
    let cfg = EngineConfig::default();
    let frame = Rect::new(0.0, 0.0, 640.0, 480.0);
    let badge = label_badge(frame, 100.0, 1.0, BadgeAnchor::TopLeftInset, &cfg);
    assert_eq!(badge.rect, Rect::new(20.0, 20.0, 160.0, 80.0));
    assert_eq!(badge.text_x, 40.0);
    assert_eq!(badge.text_center_y, 50.0);
    assert_eq!(badge.font_size, 40.0);
}

#[test]
fn bottom_badge_metrics_follow_scale() {
    let cfg = EngineConfig::default();
    let photo = Rect::new(100.0, 50.0, 300.0, 250.0);
    let badge = label_badge(photo, 50.0, 0.5, BadgeAnchor::BottomCenter, &cfg);
    assert_eq!(badge.rect.width(), 70.0);
    assert_eq!(badge.rect.height(), 30.0);
    assert_eq!(badge.rect.y1, 240.0);
    assert_eq!(badge.rect.center().x, 200.0);
    assert_eq!(badge.font_size, 20.0);
}

#[test]
fn accumulated_float_widths_keep_the_last_pixel_column() {
    let cfg = EngineConfig::default();
    let records = [rec(100, 300), rec(100, 900), rec(100, 900), rec(100, 900)];
    let plan = plan_composite(&records, &horizontal(1.0), &cfg).unwrap();
    let sum: f64 = plan.placements.iter().map(|p| p.final_width).sum();
    assert!((plan.canvas_width - 200.0).abs() < 1e-9);
    assert!((sum - 200.0).abs() < 1e-9);
    assert_eq!(plan.canvas_size_px(), (200, 300));
}

#[test]
fn genuinely_fractional_canvas_edges_are_still_truncated() {
    let cfg = EngineConfig::default();
    let plan = plan_composite(&[rec(100, 300), rec(101, 200)], &horizontal(1.0), &cfg).unwrap();
    // 100 + 101 * 1.5 = 251.5
    assert_eq!(plan.canvas_size_px(), (251, 300));
}
