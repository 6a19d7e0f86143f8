//! progress-strip lays out and renders small sets of progress photos.
//!
//! A [`Session`] owns an ordered batch of [`ImageRecord`]s (rotation in quarter turns, a
//! horizontal flip and a label per photo). An [`Exporter`] turns a snapshot of those records into
//! one of two artifacts:
//!
//! - an animated GIF, one frame per photo, through a [`SequenceEncoder`]
//! - a labelled composite strip with an optional title band, encoded as JPEG
//!
//! Layout is pure geometry ([`plan_composite`], [`frame_size`]); drawing goes through a small
//! draw-op IR ([`DrawList`]) executed by a [`RasterSurface`] ([`CpuSurface`] by default).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod encode;
pub(crate) mod export;
pub(crate) mod layout;
pub(crate) mod render;
pub(crate) mod session;

pub use crate::foundation::config::{ENV_PREFIX, EngineConfig};
pub use crate::foundation::core::{Affine, Orientation, Point, Rect, Rgba8, Rotation, Vec2};
pub use crate::foundation::error::{StripError, StripResult};

pub use crate::assets::PreparedImage;
pub use crate::assets::decode::{
    SourceFormat, decode_image, decode_image_as, sniff_format, unpremultiply_rgba8,
};
pub use crate::assets::source::{
    DecodedSource, LoadReport, SourceFile, derived_name, load_sources, validate_sources,
};
pub use crate::assets::text::{FALLBACK_ADVANCE_EM, TextBrushRgba8, TextShaper, estimate_width};

pub use crate::session::record::ImageRecord;
pub use crate::session::state::{BatchLoad, Session};

pub use crate::layout::plan::{
    BadgeAnchor, BadgeGeometry, LayoutPlan, LayoutRequest, Placement, SizeCap, TitleBand,
    frame_size, label_badge, plan_composite,
};

pub use crate::render::cpu::CpuSurface;
pub use crate::render::draw::{
    DrawList, DrawOp, TextAlign, compile_composite, compile_frame, image_transform,
};
pub use crate::render::surface::{FrameRGBA, RasterSurface, execute_draw_list};

pub use crate::encode::sequence::{
    GifSequenceEncoder, SequenceEncoder, SequenceFrame, SequenceTarget,
};
pub use crate::encode::still::encode_jpeg;

pub use crate::export::pipeline::{
    ArtifactKind, ExportArtifact, ExportMode, ExportOptions, Exporter, sanitize_file_stem,
    suggested_file_name,
};
pub use crate::export::progress::{
    ExportEvent, ExportEventLog, ExportObserver, ExportPhase, ExportState, ProgressTracker,
};
