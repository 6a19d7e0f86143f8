use std::path::PathBuf;

use crate::foundation::error::{StripError, StripResult};

/// Prefix for environment variable overrides, e.g. `PROGRESS_STRIP_JPEG_QUALITY=80`.
pub const ENV_PREFIX: &str = "PROGRESS_STRIP_";

/// Tunable constants for loading, layout, rendering and encoding.
///
/// Every field has a default matching the established behaviour, so a config built from an
/// empty JSON object (or [`EngineConfig::default`]) exports the same artifacts as before.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of source files per batch.
    pub max_sources: usize,
    /// Maximum encoded size of a single source file, in bytes.
    pub max_source_bytes: usize,
    /// Unscaled horizontal strip width above which the composite is stacked vertically.
    pub auto_vertical_threshold_px: f64,
    /// Lower bound for the composite title font size.
    pub title_font_floor_px: f64,
    /// Title font size is `target_height / title_font_divisor` when that exceeds the floor.
    pub title_font_divisor: f64,
    /// Label text size.
    pub label_font_px: f64,
    /// Horizontal padding between label text and badge edge.
    pub badge_padding_px: f64,
    /// Badge height.
    pub badge_height_px: f64,
    /// Gap between a bottom-centred badge and the bottom edge of its photo.
    pub badge_margin_px: f64,
    /// Inset of the top-left badge in animated frames.
    pub badge_inset_px: f64,
    /// Badge background opacity in `[0, 1]`.
    pub badge_opacity: f64,
    /// Delay of every animated frame, in milliseconds.
    pub frame_delay_ms: u32,
    /// Quality hint handed to the sequence encoder (1 = best, 30 = fastest).
    pub gif_quality_hint: u8,
    /// JPEG quality of the composite, 1..=100.
    pub jpeg_quality: u8,
    /// Font file used for titles and labels; text is measured approximately without one.
    pub font_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sources: 6,
            max_source_bytes: 10 * 1024 * 1024,
            auto_vertical_threshold_px: 8192.0,
            title_font_floor_px: 80.0,
            title_font_divisor: 15.0,
            label_font_px: 40.0,
            badge_padding_px: 20.0,
            badge_height_px: 60.0,
            badge_margin_px: 20.0,
            badge_inset_px: 20.0,
            badge_opacity: 0.6,
            frame_delay_ms: 800,
            gif_quality_hint: 10,
            jpeg_quality: 90,
            font_path: None,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config document; missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> StripResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| StripError::config(format!("parse engine config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `PROGRESS_STRIP_*` process environment variables.
    pub fn from_env() -> StripResult<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`, keyed by `PROGRESS_STRIP_<FIELD>`.
    ///
    /// Every field has an override named after it in upper case, e.g.
    /// `PROGRESS_STRIP_BADGE_OPACITY`; an empty `PROGRESS_STRIP_FONT_PATH` is ignored.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> StripResult<Self> {
        let get = |field: &str| lookup(&format!("{ENV_PREFIX}{field}"));

        if let Some(v) = get("MAX_SOURCES") {
            self.max_sources = parse_env("MAX_SOURCES", &v)?;
        }
        if let Some(v) = get("MAX_SOURCE_BYTES") {
            self.max_source_bytes = parse_env("MAX_SOURCE_BYTES", &v)?;
        }
        if let Some(v) = get("AUTO_VERTICAL_THRESHOLD_PX") {
            self.auto_vertical_threshold_px = parse_env("AUTO_VERTICAL_THRESHOLD_PX", &v)?;
        }
        if let Some(v) = get("TITLE_FONT_FLOOR_PX") {
            self.title_font_floor_px = parse_env("TITLE_FONT_FLOOR_PX", &v)?;
        }
        if let Some(v) = get("TITLE_FONT_DIVISOR") {
            self.title_font_divisor = parse_env("TITLE_FONT_DIVISOR", &v)?;
        }
        if let Some(v) = get("LABEL_FONT_PX") {
            self.label_font_px = parse_env("LABEL_FONT_PX", &v)?;
        }
        if let Some(v) = get("BADGE_PADDING_PX") {
            self.badge_padding_px = parse_env("BADGE_PADDING_PX", &v)?;
        }
        if let Some(v) = get("BADGE_HEIGHT_PX") {
            self.badge_height_px = parse_env("BADGE_HEIGHT_PX", &v)?;
        }
        if let Some(v) = get("BADGE_MARGIN_PX") {
            self.badge_margin_px = parse_env("BADGE_MARGIN_PX", &v)?;
        }
        if let Some(v) = get("BADGE_INSET_PX") {
            self.badge_inset_px = parse_env("BADGE_INSET_PX", &v)?;
        }
        if let Some(v) = get("BADGE_OPACITY") {
            self.badge_opacity = parse_env("BADGE_OPACITY", &v)?;
        }
        if let Some(v) = get("FRAME_DELAY_MS") {
            self.frame_delay_ms = parse_env("FRAME_DELAY_MS", &v)?;
        }
        if let Some(v) = get("GIF_QUALITY_HINT") {
            self.gif_quality_hint = parse_env("GIF_QUALITY_HINT", &v)?;
        }
        if let Some(v) = get("JPEG_QUALITY") {
            self.jpeg_quality = parse_env("JPEG_QUALITY", &v)?;
        }
        if let Some(v) = get("FONT_PATH").filter(|v| !v.trim().is_empty()) {
            self.font_path = Some(PathBuf::from(v));
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject values that would make layout or encoding meaningless.
    pub fn validate(&self) -> StripResult<()> {
        if self.max_sources == 0 {
            return Err(StripError::config("max_sources must be > 0"));
        }
        if self.max_source_bytes == 0 {
            return Err(StripError::config("max_source_bytes must be > 0"));
        }
        let positive = [
            ("auto_vertical_threshold_px", self.auto_vertical_threshold_px),
            ("title_font_floor_px", self.title_font_floor_px),
            ("title_font_divisor", self.title_font_divisor),
            ("label_font_px", self.label_font_px),
            ("badge_height_px", self.badge_height_px),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(StripError::config(format!("{name} must be finite and > 0")));
            }
        }
        let non_negative = [
            ("badge_padding_px", self.badge_padding_px),
            ("badge_margin_px", self.badge_margin_px),
            ("badge_inset_px", self.badge_inset_px),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(StripError::config(format!("{name} must be finite and >= 0")));
            }
        }
        if !(0.0..=1.0).contains(&self.badge_opacity) {
            return Err(StripError::config("badge_opacity must be within [0, 1]"));
        }
        if !(1..=30).contains(&self.gif_quality_hint) {
            return Err(StripError::config("gif_quality_hint must be within 1..=30"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(StripError::config("jpeg_quality must be within 1..=100"));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(field: &str, raw: &str) -> StripResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| StripError::config(format!("{ENV_PREFIX}{field}='{raw}': {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
