use std::{sync::Arc, time::SystemTime};

use crate::{
    assets::{PreparedImage, source::DecodedSource},
    foundation::{
        core::Rotation,
        error::{StripError, StripResult},
    },
};

/// One loaded photo and its per-image edits.
#[derive(Clone, Debug)]
pub struct ImageRecord {
    file_name: String,
    derived_name: String,
    custom_label: Option<String>,
    captured_at: Option<SystemTime>,
    rotation: Rotation,
    flipped: bool,
    position: usize,
    image: Arc<PreparedImage>,
}

impl ImageRecord {
    /// Wrap a decoded raster. The derived name is the file name without its extension.
    pub fn new(file_name: impl Into<String>, image: Arc<PreparedImage>) -> Self {
        let file_name = file_name.into();
        Self {
            derived_name: crate::assets::source::derived_name(&file_name),
            file_name,
            custom_label: None,
            captured_at: None,
            rotation: Rotation::Deg0,
            flipped: false,
            position: 0,
            image,
        }
    }

    pub(crate) fn from_decoded(src: DecodedSource, position: usize) -> Self {
        Self {
            file_name: src.name,
            derived_name: src.derived_name,
            custom_label: None,
            captured_at: src.captured_at,
            rotation: Rotation::Deg0,
            flipped: false,
            position,
            image: src.image,
        }
    }

    /// Original file name, for display.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name without extension; the default label.
    pub fn derived_name(&self) -> &str {
        &self.derived_name
    }

    /// User-provided label, if any.
    pub fn custom_label(&self) -> Option<&str> {
        self.custom_label.as_deref()
    }

    /// Text drawn in the label badge: the custom label, or the derived name when it is unset
    /// or empty.
    pub fn label(&self) -> &str {
        match self.custom_label.as_deref() {
            Some(l) if !l.is_empty() => l,
            _ => &self.derived_name,
        }
    }

    /// Source modification time, if known.
    pub fn captured_at(&self) -> Option<SystemTime> {
        self.captured_at
    }

    /// Current rotation.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// `true` when mirrored horizontally.
    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// Index in the ordered record list.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Decoded raster.
    pub fn image(&self) -> &Arc<PreparedImage> {
        &self.image
    }

    /// Intrinsic raster width.
    pub fn pixel_width(&self) -> u32 {
        self.image.width
    }

    /// Intrinsic raster height.
    pub fn pixel_height(&self) -> u32 {
        self.image.height
    }

    /// Width after rotation.
    pub fn visual_width(&self) -> u32 {
        self.visual_size().0
    }

    /// Height after rotation.
    pub fn visual_height(&self) -> u32 {
        self.visual_size().1
    }

    /// `(width, height)` after rotation; swapped for 90 and 270 degrees.
    pub fn visual_size(&self) -> (u32, u32) {
        if self.rotation.swaps_axes() {
            (self.image.height, self.image.width)
        } else {
            (self.image.width, self.image.height)
        }
    }

    /// Rotate by a multiple of 90 degrees (negative is counter-clockwise).
    pub fn rotate_by(&mut self, degrees: i32) -> StripResult<()> {
        self.rotation = self.rotation.rotated_by(degrees)?;
        Ok(())
    }

    /// Set an absolute rotation.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Toggle the horizontal mirror.
    pub fn toggle_flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Override the label; an empty string restores the derived name.
    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.custom_label = if label.is_empty() { None } else { Some(label) };
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub(crate) fn ensure_positive_dimensions(&self) -> StripResult<()> {
        if self.image.width == 0 || self.image.height == 0 {
            return Err(StripError::invalid_geometry(format!(
                "'{}' has degenerate size {}x{}",
                self.file_name, self.image.width, self.image.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/record.rs"]
mod tests;
