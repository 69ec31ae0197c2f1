//! Frame sequencing: preview and render loops, pacing, progress and cancellation.

/// Time sources used for pacing.
pub mod clock;
/// The preview/render driver.
pub mod sequencer;
