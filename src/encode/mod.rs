//! Encoding sinks.
//!
//! Sinks consume composited frames in order and hand back the encoded byte stream once finalized.

/// `ffmpeg`-based sink (WebM/MP4 through the system `ffmpeg`).
pub mod ffmpeg;
/// Mime candidates, negotiation and artifact naming.
pub mod mime;
/// Generic video sink trait and the in-memory sink.
pub mod sink;
