use std::{path::Path, sync::Arc};

use anyhow::Context as _;

use crate::foundation::{
    core::Rgba8,
    error::{StripError, StripResult},
};

/// Average advance of a bold sans-serif glyph, as a fraction of the font size.
///
/// Used to size label badges when no font is configured.
pub const FALLBACK_ADVANCE_EM: f64 = 0.55;

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Shapes and measures single-line title and label text.
///
/// With font bytes, text is shaped through Parley; without them, widths are estimated from
/// [`FALLBACK_ADVANCE_EM`] and [`TextShaper::layout`] returns `None`.
pub struct TextShaper {
    font: Option<LoadedFont>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

struct LoadedFont {
    bytes: Arc<Vec<u8>>,
    family_name: String,
}

impl std::fmt::Debug for TextShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextShaper")
            .field("font_family", &self.family_name())
            .field(
                "font_bytes_len",
                &self.font.as_ref().map(|f| f.bytes.len()),
            )
            .finish()
    }
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::without_font()
    }
}

impl TextShaper {
    /// Shaper that only estimates widths and never produces glyphs.
    pub fn without_font() -> Self {
        Self {
            font: None,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Register `font_bytes` and shape all text with its first family.
    pub fn with_font_bytes(font_bytes: Vec<u8>) -> StripResult<Self> {
        let mut shaper = Self::without_font();
        let families = shaper
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StripError::config("no font families registered from font bytes")
        })?;
        let family_name = shaper
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StripError::config("registered font family has no name"))?
            .to_string();

        shaper.font = Some(LoadedFont {
            bytes: Arc::new(font_bytes),
            family_name,
        });
        Ok(shaper)
    }

    /// Load a font file from disk.
    pub fn from_font_path(path: &Path) -> StripResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::with_font_bytes(bytes)
    }

    /// Family name of the configured font, if any.
    pub fn family_name(&self) -> Option<&str> {
        self.font.as_ref().map(|f| f.family_name.as_str())
    }

    /// Raw bytes of the configured font, if any.
    pub fn font_bytes(&self) -> Option<Arc<Vec<u8>>> {
        self.font.as_ref().map(|f| Arc::clone(&f.bytes))
    }

    /// `true` when glyphs can be produced.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Advance width of `text` rendered at `size_px`.
    pub fn measure(&mut self, text: &str, size_px: f64) -> StripResult<f64> {
        match self.layout(text, size_px, Rgba8::WHITE)? {
            Some(layout) => Ok(f64::from(layout.width())),
            None => Ok(estimate_width(text, size_px)),
        }
    }

    /// Shape `text` into a single unbroken line, or `None` without a font.
    pub fn layout(
        &mut self,
        text: &str,
        size_px: f64,
        color: Rgba8,
    ) -> StripResult<Option<parley::Layout<TextBrushRgba8>>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StripError::render("text size must be finite and > 0"));
        }
        let Some(font) = &self.font else {
            return Ok(None);
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(font.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px as f32));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8::from(
            color,
        )));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(Some(layout))
    }
}

/// Width estimate for `text` at `size_px` when no font is available.
pub fn estimate_width(text: &str, size_px: f64) -> f64 {
    text.chars().count() as f64 * size_px * FALLBACK_ADVANCE_EM
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
