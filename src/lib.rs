//! Markshot synthesizes short videos that look like a photographed note.
//!
//! Every frame is composited procedurally on a fresh [`RenderSurface`]:
//!
//! - paper tone, vignette and folds
//! - faint printed filler paragraphs
//! - a background blur
//! - the phrase with its highlighted substrings, drawn sharp
//! - camera grain
//!
//! A [`FrameSequencer`] drives the compositor at a target frame rate and streams frames into a
//! [`VideoSink`], such as [`FfmpegSink`], which returns the encoded bytes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Job options, surface size and per-frame inputs.
pub mod config;
/// Whole-surface post effects.
pub mod effects;
/// Encoding sinks and mime negotiation.
pub mod encode;
/// Frame compositing stages.
pub mod render;
/// Preview and render sequencing.
pub mod session;
/// Text measurement and drawing.
pub mod text;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Vec2,
};
pub use crate::foundation::error::{MarkshotError, MarkshotResult};

pub use crate::config::job::{FrameState, JobOptions, ResolvedJob, VideoJobConfig};
pub use crate::config::surface::SurfaceConfig;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::mime::{
    DEFAULT_MIME_CANDIDATES, EncodedArtifact, artifact_filename, select_mime,
};
pub use crate::encode::sink::{InMemorySink, SinkConfig, VideoSink};
pub use crate::render::highlight::{HighlightOccurrence, HighlightRect, PhraseLayout};
pub use crate::render::pipeline::{ComposedFrame, FrameCompositor};
pub use crate::render::surface::{FrameRGBA, RenderSurface};
pub use crate::session::clock::{Clock, ManualClock, SystemClock};
pub use crate::session::sequencer::{
    CancelToken, FrameSequencer, Pacing, Progress, RenderOutcome, RenderStats, Stage,
};
pub use crate::text::{BoxTypesetter, ParleyTypesetter, TextStyle, Typesetter};
