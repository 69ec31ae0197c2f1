//! Frame compositing: the drawing surface and every stage that paints onto it.

/// Highlighted phrase layout and drawing.
pub mod highlight;
/// Paper tone, vignette and folds.
pub mod paper;
/// Fixed-order frame compositor.
pub mod pipeline;
/// Faint filler paragraphs.
pub mod printed;
/// `vello_cpu` drawing and premultiplied compositing.
pub mod raster;
/// Owned pixel surface.
pub mod surface;
