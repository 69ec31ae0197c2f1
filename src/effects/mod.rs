//! Whole-surface post effects: background blur and camera grain.

/// Separable Gaussian blur.
pub mod blur;
/// Per-channel luminance grain.
pub mod grain;
