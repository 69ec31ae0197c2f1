//! Job configuration: raw host options, their resolution into immutable per-job values, and
//! surface sizing.

/// Raw job options, [`FrameState`](job::FrameState) and [`VideoJobConfig`](job::VideoJobConfig).
pub mod job;
/// Surface dimensions parsed from `WxH` strings.
pub mod surface;
