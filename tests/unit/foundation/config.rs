use std::collections::HashMap;

use super::*;

#[test]
fn defaults_match_documented_constants() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.max_sources, 6);
    assert_eq!(cfg.max_source_bytes, 10 * 1024 * 1024);
    assert_eq!(cfg.auto_vertical_threshold_px, 8192.0);
    assert_eq!(cfg.title_font_floor_px, 80.0);
    assert_eq!(cfg.frame_delay_ms, 800);
    assert_eq!(cfg.jpeg_quality, 90);
    cfg.validate().unwrap();
}

#[test]
fn empty_json_is_default() {
    assert_eq!(
        EngineConfig::from_json_str("{}").unwrap(),
        EngineConfig::default()
    );
}

#[test]
fn json_overrides_single_field() {
    let cfg = EngineConfig::from_json_str(r#"{"auto_vertical_threshold_px": 4096}"#).unwrap();
    assert_eq!(cfg.auto_vertical_threshold_px, 4096.0);
    assert_eq!(cfg.title_font_floor_px, 80.0);
}

#[test]
fn json_rejects_unknown_and_invalid_fields() {
    assert!(matches!(
        EngineConfig::from_json_str(r#"{"nope": 1}"#),
        Err(StripError::Config(_))
    ));
    assert!(matches!(
        EngineConfig::from_json_str(r#"{"jpeg_quality": 0}"#),
        Err(StripError::Config(_))
    ));
}

#[test]
fn env_overrides_apply_with_prefix() {
    let env: HashMap<&str, &str> = [
        ("PROGRESS_STRIP_JPEG_QUALITY", "75"),
        ("PROGRESS_STRIP_FRAME_DELAY_MS", " 500 "),
        ("PROGRESS_STRIP_FONT_PATH", "/fonts/Inter.ttf"),
        ("JPEG_QUALITY", "10"),
    ]
    .into_iter()
    .collect();

    let cfg = EngineConfig::default()
        .with_env_overrides(|k| env.get(k).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(cfg.jpeg_quality, 75);
    assert_eq!(cfg.frame_delay_ms, 500);
    assert_eq!(cfg.font_path, Some(PathBuf::from("/fonts/Inter.ttf")));
}

#[test]
fn env_override_parse_error_names_variable() {
    let err = EngineConfig::default()
        .with_env_overrides(|k| (k == "PROGRESS_STRIP_MAX_SOURCES").then(|| "many".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains("PROGRESS_STRIP_MAX_SOURCES"));
}

#[test]
fn every_field_has_an_env_override() {
    let env: HashMap<&str, &str> = [
        ("PROGRESS_STRIP_MAX_SOURCES", "4"),
        ("PROGRESS_STRIP_MAX_SOURCE_BYTES", "2048"),
        ("PROGRESS_STRIP_AUTO_VERTICAL_THRESHOLD_PX", "4096"),
        ("PROGRESS_STRIP_TITLE_FONT_FLOOR_PX", "60"),
        ("PROGRESS_STRIP_TITLE_FONT_DIVISOR", "12"),
        ("PROGRESS_STRIP_LABEL_FONT_PX", "32"),
        ("PROGRESS_STRIP_BADGE_PADDING_PX", "16"),
        ("PROGRESS_STRIP_BADGE_HEIGHT_PX", "48"),
        ("PROGRESS_STRIP_BADGE_MARGIN_PX", "10"),
        ("PROGRESS_STRIP_BADGE_INSET_PX", "12"),
        ("PROGRESS_STRIP_BADGE_OPACITY", "0.5"),
        ("PROGRESS_STRIP_FRAME_DELAY_MS", "400"),
        ("PROGRESS_STRIP_GIF_QUALITY_HINT", "20"),
        ("PROGRESS_STRIP_JPEG_QUALITY", "80"),
        ("PROGRESS_STRIP_FONT_PATH", "/fonts/Inter.ttf"),
    ]
    .into_iter()
    .collect();

    let cfg = EngineConfig::default()
        .with_env_overrides(|k| env.get(k).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(
        cfg,
        EngineConfig {
            max_sources: 4,
            max_source_bytes: 2048,
            auto_vertical_threshold_px: 4096.0,
            title_font_floor_px: 60.0,
            title_font_divisor: 12.0,
            label_font_px: 32.0,
            badge_padding_px: 16.0,
            badge_height_px: 48.0,
            badge_margin_px: 10.0,
            badge_inset_px: 12.0,
            badge_opacity: 0.5,
            frame_delay_ms: 400,
            gif_quality_hint: 20,
            jpeg_quality: 80,
            font_path: Some(PathBuf::from("/fonts/Inter.ttf")),
        }
    );
}

#[test]
fn out_of_range_env_override_fails_validation() {
    let err = EngineConfig::default()
        .with_env_overrides(|k| (k == "PROGRESS_STRIP_BADGE_OPACITY").then(|| "1.5".to_string()))
        .unwrap_err();
    assert!(matches!(err, StripError::Config(_)));
}
