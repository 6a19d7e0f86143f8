use super::*;

#[test]
fn fallback_measure_scales_with_size_and_length() {
    let mut shaper = TextShaper::without_font();
    assert!(!shaper.has_font());
    let w40 = shaper.measure("March", 40.0).unwrap();
    let w80 = shaper.measure("March", 80.0).unwrap();
    assert_eq!(w40, 5.0 * 40.0 * FALLBACK_ADVANCE_EM);
    assert_eq!(w80, 2.0 * w40);
    assert_eq!(shaper.measure("", 40.0).unwrap(), 0.0);
}

#[test]
fn fallback_counts_chars_not_bytes() {
    assert_eq!(estimate_width("été", 10.0), 3.0 * 10.0 * FALLBACK_ADVANCE_EM);
}

#[test]
fn layout_without_font_is_none() {
    let mut shaper = TextShaper::default();
    assert!(shaper.layout("x", 12.0, Rgba8::BLACK).unwrap().is_none());
}

#[test]
fn invalid_size_is_rejected() {
    let mut shaper = TextShaper::without_font();
    assert!(shaper.layout("x", 0.0, Rgba8::BLACK).is_err());
    assert!(shaper.measure("x", f64::NAN).is_err());
}

#[test]
fn garbage_font_bytes_are_rejected() {
    assert!(TextShaper::with_font_bytes(b"not a font".to_vec()).is_err());
}

fn test_font() -> Vec<u8> {
    std::fs::read(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/fonts/DejaVuSans-Bold.ttf"
    ))
    .unwrap()
}

#[test]
fn font_bytes_register_a_named_family() {
    let shaper = TextShaper::with_font_bytes(test_font()).unwrap();
    assert!(shaper.has_font());
    assert!(shaper.family_name().is_some_and(|f| f.contains("DejaVu")));
    assert_eq!(shaper.font_bytes().map(|b| b.len()), Some(test_font().len()));
}

#[test]
fn shaped_width_comes_from_the_font_not_the_estimate() {
    let mut shaper = TextShaper::with_font_bytes(test_font()).unwrap();
    let shaped = shaper.measure("day", 40.0).unwrap();
    assert!(shaped > 0.0);
    assert!((shaped - estimate_width("day", 40.0)).abs() > 1.0);

    let wide = shaper.measure("Wednesday", 40.0).unwrap();
    assert!(wide > shaped);
    let doubled = shaper.measure("day", 80.0).unwrap();
    assert!((doubled - 2.0 * shaped).abs() < 1.0);
}

#[test]
fn layout_with_font_carries_the_brush_color() {
    let mut shaper = TextShaper::with_font_bytes(test_font()).unwrap();
    let layout = shaper
        .layout("Jan", 80.0, Rgba8::new(10, 20, 30, 255))
        .unwrap()
        .unwrap();
    assert!(layout.height() > 0.0);
    let mut brushes = Vec::new();
    for line in layout.lines() {
        for item in line.items() {
            if let parley::layout::PositionedLayoutItem::GlyphRun(run) = item {
                brushes.push(run.style().brush);
            }
        }
    }
    assert!(!brushes.is_empty());
    let expected = TextBrushRgba8::from(Rgba8::new(10, 20, 30, 255));
    assert!(brushes.iter().all(|b| *b == expected));
}
