use std::sync::Arc;

use super::*;
use crate::{
    assets::PreparedImage,
    foundation::core::Orientation,
    layout::plan::{LayoutRequest, plan_composite},
};

fn rec(name: &str, w: u32, h: u32) -> ImageRecord {
    ImageRecord::new(
        name,
        Arc::new(PreparedImage {
            width: w,
            height: h,
            rgba8_premul: Arc::new(Vec::new()),
        }),
    )
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn upright_transform_maps_source_corners_to_box() {
    let t = image_transform(
        Point::new(150.0, 75.0),
        200.0,
        100.0,
        (100, 50),
        Rotation::Deg0,
        false,
    );
    assert!(close(t * Point::new(0.0, 0.0), Point::new(50.0, 25.0)));
    assert!(close(t * Point::new(100.0, 50.0), Point::new(250.0, 125.0)));
}

#[test]
fn quarter_turn_draws_swapped_and_fills_box() {
    let t = image_transform(
        Point::new(400.0, 300.0),
        800.0,
        600.0,
        (600, 800),
        Rotation::Deg90,
        false,
    );
    // Top-left of the portrait source lands on the top-right of the landscape box.
    assert!(close(t * Point::new(0.0, 0.0), Point::new(800.0, 0.0)));
    assert!(close(t * Point::new(600.0, 800.0), Point::new(0.0, 600.0)));
}

#[test]
fn flip_mirrors_horizontally_after_rotation() {
    let t = image_transform(
        Point::new(50.0, 25.0),
        100.0,
        50.0,
        (100, 50),
        Rotation::Deg0,
        true,
    );
    assert!(close(t * Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
    assert!(close(t * Point::new(100.0, 50.0), Point::new(0.0, 50.0)));

    let t = image_transform(
        Point::new(50.0, 25.0),
        100.0,
        50.0,
        (100, 50),
        Rotation::Deg180,
        true,
    );
    // 180 then mirror is a vertical flip.
    assert!(close(t * Point::new(0.0, 0.0), Point::new(0.0, 50.0)));
}

#[test]
fn frame_list_clears_then_draws_image_and_top_left_badge() {
    let cfg = EngineConfig::default();
    let mut text = TextShaper::without_font();
    let r = rec("day-1.png", 640, 480);
    let list = compile_frame(3, &r, (320, 240), &mut text, &cfg).unwrap();

    assert_eq!((list.width, list.height), (320, 240));
    assert_eq!(list.ops.len(), 4);
    assert_eq!(list.ops[0], DrawOp::Clear);
    assert!(matches!(list.ops[1], DrawOp::Image { source: 3, .. }));
    let DrawOp::FillRect { rect, color } = list.ops[2] else {
        panic!("expected badge rect");
    };
    assert_eq!((rect.x0, rect.y0), (20.0, 20.0));
    assert_eq!(rect.height(), 60.0);
    assert_eq!(color, Rgba8::new(0, 0, 0, 153));
    let DrawOp::Text {
        text, x, align, ..
    } = &list.ops[3]
    else {
        panic!("expected label text");
    };
    assert_eq!(text, "day-1");
    assert_eq!(*x, 40.0);
    assert_eq!(*align, TextAlign::Start);
}

#[test]
fn composite_list_has_background_title_and_one_group_per_record() {
    let cfg = EngineConfig::default();
    let mut text = TextShaper::without_font();
    let mut b = rec("b.png", 600, 800);
    b.set_rotation(Rotation::Deg90);
    b.set_label("After");
    let records = [rec("a.png", 800, 600), b];
    let request = LayoutRequest {
        orientation: Orientation::Horizontal,
        global_scale: 1.0,
        title: "Cut".to_string(),
    };
    let plan = plan_composite(&records, &request, &cfg).unwrap();
    let list = compile_composite(&records, &plan, &mut text, &cfg).unwrap();

    assert_eq!((list.width, list.height), (1600, 840));
    assert_eq!(list.ops.len(), 2 + 2 * 3);
    assert_eq!(
        list.ops[0],
        DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, 1600.0, 840.0),
            color: Rgba8::WHITE
        }
    );
    let DrawOp::Text {
        text: title,
        x,
        center_y,
        align,
        color,
        ..
    } = &list.ops[1]
    else {
        panic!("expected title");
    };
    assert_eq!(title, "Cut");
    assert_eq!((*x, *center_y), (800.0, 120.0));
    assert_eq!(*align, TextAlign::Center);
    assert_eq!(*color, Rgba8::BLACK);

    assert!(matches!(list.ops[5], DrawOp::Image { source: 1, .. }));
    let DrawOp::Text { text: label, .. } = &list.ops[7] else {
        panic!("expected label");
    };
    assert_eq!(label, "After");
}

#[test]
fn composite_badges_sit_above_each_bottom_edge() {
    let cfg = EngineConfig::default();
    let mut text = TextShaper::without_font();
    let records = [rec("a.png", 400, 300), rec("b.png", 400, 300)];
    let plan = plan_composite(&records, &LayoutRequest::default(), &cfg).unwrap();
    let list = compile_composite(&records, &plan, &mut text, &cfg).unwrap();

    let badges = list
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::FillRect { rect, color } if *color != Rgba8::WHITE => Some(*rect),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(badges.len(), 2);
    assert_eq!(badges[0].y1, 280.0);
    assert_eq!(badges[0].center().x, 200.0);
    assert_eq!(badges[1].center().x, 600.0);
}
