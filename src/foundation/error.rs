/// Convenience result type used across the crate.
pub type StripResult<T> = Result<T, StripError>;

/// Top-level error taxonomy used by load and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum StripError {
    /// Rejected caller input: file count, size, format, indices or options.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A single source raster failed to decode.
    #[error("source decode failure: '{name}': {reason}")]
    SourceDecode {
        /// File name of the failing source.
        name: String,
        /// Decoder message.
        reason: String,
    },

    /// Every source in a batch failed to decode.
    #[error("all {count} sources failed to decode")]
    AllSourcesFailed {
        /// Number of sources that were attempted.
        count: usize,
    },

    /// Degenerate dimensions encountered while computing a layout.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The sequence or still-image encoder failed.
    #[error("encode failure: {0}")]
    Encode(String),

    /// The raster surface could not execute a draw list.
    #[error("render error: {0}")]
    Render(String),

    /// Malformed configuration or options payload.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StripError {
    /// Build a [`StripError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`StripError::SourceDecode`] value.
    pub fn source_decode(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::SourceDecode {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`StripError::InvalidGeometry`] value.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Build a [`StripError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`StripError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StripError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
