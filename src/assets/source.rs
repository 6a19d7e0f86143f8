use std::{
    path::Path,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context as _;

use crate::{
    assets::{
        PreparedImage,
        decode::{decode_image_as, sniff_format},
    },
    foundation::{
        config::EngineConfig,
        error::{StripError, StripResult},
    },
};

/// One user-selected source file, already read into memory.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// Original file name, including extension.
    pub name: String,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Last-modified time; sources are ordered oldest first.
    pub modified: Option<SystemTime>,
}

impl SourceFile {
    /// Build a source from in-memory bytes.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, modified: Option<SystemTime>) -> Self {
        Self {
            name: name.into(),
            bytes,
            modified,
        }
    }

    /// Read a file from disk, capturing its name and modification time.
    pub fn read(path: impl AsRef<Path>) -> StripResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read source '{}'", path.display()))?;
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            bytes,
            modified,
        })
    }
}

/// A source that decoded successfully, in temporal order.
#[derive(Clone, Debug)]
pub struct DecodedSource {
    /// Original file name.
    pub name: String,
    /// File name with its final extension removed.
    pub derived_name: String,
    /// Last-modified time of the file, if known.
    pub captured_at: Option<SystemTime>,
    /// Decoded raster.
    pub image: Arc<PreparedImage>,
}

/// Outcome of a partial-tolerant batch decode.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully decoded sources, oldest first.
    pub decoded: Vec<DecodedSource>,
    /// Per-file decode failures (always [`StripError::SourceDecode`]).
    pub skipped: Vec<StripError>,
}

impl LoadReport {
    /// Number of files that were attempted.
    pub fn attempted(&self) -> usize {
        self.decoded.len() + self.skipped.len()
    }
}

/// Strip the final extension from a file name: `"jan.final.jpg"` becomes `"jan.final"`.
pub fn derived_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => file_name[..idx].to_string(),
        _ => file_name.to_string(),
    }
}

/// Validate a batch without decoding it.
///
/// Rejects empty batches, batches over `max_sources`, oversize files and unaccepted formats.
pub fn validate_sources(files: &[SourceFile], cfg: &EngineConfig) -> StripResult<()> {
    if files.is_empty() {
        return Err(StripError::invalid_input("no source files selected"));
    }
    if files.len() > cfg.max_sources {
        return Err(StripError::invalid_input(format!(
            "{} files selected; at most {} are supported",
            files.len(),
            cfg.max_sources
        )));
    }
    for f in files {
        if f.bytes.len() > cfg.max_source_bytes {
            return Err(StripError::invalid_input(format!(
                "'{}' is {} bytes; the limit is {} bytes",
                f.name,
                f.bytes.len(),
                cfg.max_source_bytes
            )));
        }
        sniff_format(&f.bytes)
            .map_err(|e| StripError::invalid_input(format!("'{}': {e}", f.name)))?;
    }
    Ok(())
}

/// Validate, order oldest first and decode a batch of sources one at a time.
///
/// Individual decode failures are collected in [`LoadReport::skipped`]; if none decode the
/// whole batch fails with [`StripError::AllSourcesFailed`].
#[tracing::instrument(skip(files, cfg), fields(count = files.len()))]
pub fn load_sources(files: Vec<SourceFile>, cfg: &EngineConfig) -> StripResult<LoadReport> {
    validate_sources(&files, cfg)?;

    let mut files = files;
    // Stable: equal or unknown timestamps keep selection order.
    files.sort_by_key(|f| f.modified.unwrap_or(UNIX_EPOCH));

    let mut report = LoadReport::default();
    for f in files {
        let decoded = sniff_format(&f.bytes).and_then(|fmt| decode_image_as(&f.bytes, fmt));
        match decoded {
            Ok(image) => {
                tracing::debug!(
                    name = %f.name,
                    width = image.width,
                    height = image.height,
                    "decoded source"
                );
                report.decoded.push(DecodedSource {
                    derived_name: derived_name(&f.name),
                    name: f.name,
                    captured_at: f.modified,
                    image: Arc::new(image),
                });
            }
            Err(e) => {
                tracing::warn!(name = %f.name, error = %e, "skipping source that failed to decode");
                report.skipped.push(StripError::source_decode(f.name, e));
            }
        }
    }

    if report.decoded.is_empty() {
        return Err(StripError::AllSourcesFailed {
            count: report.skipped.len(),
        });
    }
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
