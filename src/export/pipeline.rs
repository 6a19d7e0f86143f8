use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    assets::text::TextShaper,
    encode::{
        sequence::{SequenceEncoder, SequenceFrame, SequenceTarget},
        still::encode_jpeg,
    },
    export::progress::{ExportObserver, ExportPhase, ExportState, ProgressTracker},
    foundation::{
        config::EngineConfig,
        core::Orientation,
        error::{StripError, StripResult},
    },
    layout::plan::{LayoutRequest, SizeCap, frame_size, plan_composite},
    render::{
        cpu::CpuSurface,
        draw::{compile_composite, compile_frame},
        surface::{RasterSurface, execute_draw_list},
    },
    session::record::ImageRecord,
};

/// Which artifact an export produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// One frame per record, encoded as an animated sequence.
    Animate,
    /// All records side by side (or stacked) in a single JPEG.
    #[default]
    Composite,
}

/// Caller-facing export settings, deserializable from camelCase JSON.
///
/// ```json
/// { "mode": "composite", "sizeCap": 720, "layout": "horizontal",
///   "globalScale": 0.5, "title": "Week 4" }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Artifact kind.
    pub mode: ExportMode,
    /// Width cap for animated frames; anything but a positive integer means original size.
    #[serde(
        serialize_with = "serialize_size_cap",
        deserialize_with = "deserialize_size_cap"
    )]
    pub size_cap: SizeCap,
    /// Requested composite orientation.
    pub layout: Orientation,
    /// Uniform scale applied to the finished composite layout.
    pub global_scale: f64,
    /// Composite title; blank means no title band.
    pub title: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            mode: ExportMode::Composite,
            size_cap: SizeCap::Original,
            layout: Orientation::Horizontal,
            global_scale: 1.0,
            title: String::new(),
        }
    }
}

impl ExportOptions {
    /// Parse options JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> StripResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| StripError::config(format!("parse export options: {e}")))
    }
}

fn serialize_size_cap<S: Serializer>(cap: &SizeCap, s: S) -> Result<S::Ok, S::Error> {
    match cap {
        SizeCap::Original => s.serialize_str("original"),
        SizeCap::Pixels(px) => s.serialize_u32(*px),
    }
}

fn deserialize_size_cap<'de, D: Deserializer<'de>>(d: D) -> Result<SizeCap, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    let pixels = match &value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(match pixels.and_then(|p| u32::try_from(p).ok()) {
        Some(px) if px > 0 => SizeCap::Pixels(px),
        _ => SizeCap::Original,
    })
}

/// Kind of a finished artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Looping animated GIF.
    AnimatedGif,
    /// Composite JPEG.
    CompositeJpeg,
}

impl ArtifactKind {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::AnimatedGif => "gif",
            Self::CompositeJpeg => "jpg",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::AnimatedGif => "image/gif",
            Self::CompositeJpeg => "image/jpeg",
        }
    }
}

/// Encoded output of one export.
#[derive(Clone, Debug)]
pub struct ExportArtifact {
    /// What the bytes contain.
    pub kind: ArtifactKind,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Suggested download name.
    pub file_name: String,
}

/// Filesystem-safe stem for `title`: runs of whitespace or reserved characters become one `_`;
/// a blank title yields `progress`.
pub fn sanitize_file_stem(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_run = false;
    for ch in title.trim().chars() {
        let unsafe_char = ch.is_whitespace()
            || ch.is_control()
            || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|');
        if unsafe_char {
            if !in_run {
                out.push('_');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    if out.is_empty() {
        "progress".to_string()
    } else {
        out
    }
}

/// `<stem>.<ext>` for an artifact of `kind` titled `title`.
pub fn suggested_file_name(title: &str, kind: ArtifactKind) -> String {
    format!("{}.{}", sanitize_file_stem(title), kind.extension())
}

/// Renders record snapshots into export artifacts.
///
/// One raster surface is reused across exports; `export` takes `&mut self`, so exports sharing
/// an exporter run one at a time.
#[derive(Debug)]
pub struct Exporter {
    config: EngineConfig,
    surface: CpuSurface,
}

impl Exporter {
    /// Exporter using `config`, loading `config.font_path` when set.
    ///
    /// With the default config there is no font: titles and labels are measured with
    /// [`crate::estimate_width`] and badges are drawn, but no glyphs are rendered. Set
    /// `font_path` or use [`Exporter::with_text_shaper`] to draw text.
    pub fn new(config: EngineConfig) -> StripResult<Self> {
        config.validate()?;
        let text = match &config.font_path {
            Some(path) => TextShaper::from_font_path(path)?,
            None => TextShaper::without_font(),
        };
        Ok(Self::with_text_shaper(config, text))
    }

    /// Exporter with an explicit text shaper; `config.font_path` is ignored.
    pub fn with_text_shaper(config: EngineConfig, text: TextShaper) -> Self {
        Self {
            config,
            surface: CpuSurface::new(text),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Export `records` (in order) as the artifact selected by `options.mode`.
    ///
    /// Returns `Ok(None)` without touching the observer when `records` is empty. On failure
    /// the observer sees [`ExportState::Failed`] and the error is returned.
    #[tracing::instrument(skip_all, fields(mode = ?options.mode, records = records.len()))]
    pub fn export(
        &mut self,
        records: &[ImageRecord],
        options: &ExportOptions,
        encoder: &mut dyn SequenceEncoder,
        observer: &mut dyn ExportObserver,
    ) -> StripResult<Option<ExportArtifact>> {
        if records.is_empty() {
            tracing::debug!("nothing to export");
            return Ok(None);
        }

        let mut tracker = ProgressTracker::new(observer);
        let result = match options.mode {
            ExportMode::Animate => self.export_animated(records, options, encoder, &mut tracker),
            ExportMode::Composite => self.export_composite(records, options, &mut tracker),
        };
        self.surface.release_sources();

        match result.and_then(|artifact| {
            tracker.transition(ExportState::Done)?;
            Ok(artifact)
        }) {
            Ok(artifact) => {
                tracing::info!(
                    file = %artifact.file_name,
                    bytes = artifact.bytes.len(),
                    width = artifact.width,
                    height = artifact.height,
                    "export finished"
                );
                tracker.finished(&artifact);
                Ok(Some(artifact))
            }
            Err(err) => {
                tracker.fail(&err);
                Err(err)
            }
        }
    }

    fn prepare_sources(
        &mut self,
        records: &[ImageRecord],
        mut on_prepared: impl FnMut(usize, usize),
    ) -> StripResult<()> {
        self.surface.release_sources();
        for (idx, record) in records.iter().enumerate() {
            record.ensure_positive_dimensions()?;
            self.surface.prepare_source(idx, record.image())?;
            on_prepared(idx + 1, records.len());
        }
        Ok(())
    }

    fn export_animated(
        &mut self,
        records: &[ImageRecord],
        options: &ExportOptions,
        encoder: &mut dyn SequenceEncoder,
        tracker: &mut ProgressTracker<'_>,
    ) -> StripResult<ExportArtifact> {
        tracker.transition(ExportState::LoadingSources)?;
        self.prepare_sources(records, |_, _| {})?;

        tracker.transition(ExportState::LayingOut)?;
        let (width, height) = frame_size(records, options.size_cap)?;
        tracing::debug!(width, height, "animated frame size");

        tracker.transition(ExportState::Drawing)?;
        let mut frames = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            let list = compile_frame(
                idx,
                record,
                (width, height),
                self.surface.text_mut(),
                &self.config,
            )?;
            let frame = execute_draw_list(&mut self.surface, &list, |_, _| {})?;
            frames.push(SequenceFrame {
                frame,
                delay_ms: self.config.frame_delay_ms,
            });
        }

        tracker.transition(ExportState::Encoding)?;
        let target = SequenceTarget {
            width,
            height,
            quality_hint: self.config.gif_quality_hint,
        };
        let bytes = encoder
            .encode(&frames, &target, &mut |p: f64| {
                tracker.report(ExportPhase::Encoding, p)
            })
            .map_err(as_encode_error)?;
        tracker.complete(ExportPhase::Encoding);

        Ok(ExportArtifact {
            kind: ArtifactKind::AnimatedGif,
            bytes,
            width,
            height,
            file_name: suggested_file_name(&options.title, ArtifactKind::AnimatedGif),
        })
    }

    fn export_composite(
        &mut self,
        records: &[ImageRecord],
        options: &ExportOptions,
        tracker: &mut ProgressTracker<'_>,
    ) -> StripResult<ExportArtifact> {
        tracker.transition(ExportState::LoadingSources)?;
        tracker.report(ExportPhase::Loading, 0.0);
        self.prepare_sources(records, |done, total| {
            tracker.report(ExportPhase::Loading, 0.5 * done as f64 / total as f64)
        })?;

        tracker.transition(ExportState::LayingOut)?;
        let request = LayoutRequest {
            orientation: options.layout,
            global_scale: options.global_scale,
            title: options.title.clone(),
        };
        let plan = plan_composite(records, &request, &self.config)?;

        tracker.transition(ExportState::Drawing)?;
        let list = compile_composite(records, &plan, self.surface.text_mut(), &self.config)?;
        // One extra step is left for the encoder.
        let frame = execute_draw_list(&mut self.surface, &list, |done, total| {
            let steps = (total + 1) as f64;
            tracker.report(ExportPhase::Drawing, 0.5 + 0.5 * done as f64 / steps)
        })?;

        tracker.transition(ExportState::Encoding)?;
        let bytes = encode_jpeg(&frame, self.config.jpeg_quality)?;
        tracker.complete(ExportPhase::Encoding);

        Ok(ExportArtifact {
            kind: ArtifactKind::CompositeJpeg,
            bytes,
            width: frame.width,
            height: frame.height,
            file_name: suggested_file_name(&options.title, ArtifactKind::CompositeJpeg),
        })
    }
}

fn as_encode_error(err: StripError) -> StripError {
    match err {
        StripError::Encode(_) => err,
        other => StripError::encode(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
