//! Text measurement and drawing.
//!
//! Layout code only talks to the [`Typesetter`] trait: [`ParleyTypesetter`] shapes real font files
//! with Parley and emits glyph runs through `vello_cpu`, [`BoxTypesetter`] is a deterministic
//! font-less stand-in.

mod boxes;
mod parley_engine;
mod wrap;

pub use boxes::BoxTypesetter;
pub use parley_engine::{ParleyTypesetter, discover_font_files};
pub use wrap::wrap_words;

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::MarkshotResult;

/// Font size and weight of one run of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size_px: f64,
    /// CSS-style weight (400 regular, 700 bold).
    pub weight: u16,
}

impl TextStyle {
    /// Regular-weight style.
    pub fn regular(size_px: f64) -> Self {
        Self {
            size_px,
            weight: 400,
        }
    }
}

/// Vertical meaning of a draw origin's `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Baseline {
    /// `y` is the top of the line box.
    Top,
    /// `y` is the alphabetic baseline.
    Alphabetic,
}

/// How glyphs are painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextPaint {
    /// Fill glyph outlines.
    Fill(Rgba8),
    /// Stroke glyph outlines.
    Stroke {
        /// Stroke color.
        color: Rgba8,
        /// Stroke width in pixels.
        width: f64,
    },
}

/// Measures and draws single lines of text.
pub trait Typesetter {
    /// Advance width of `text` in pixels, trailing whitespace included.
    fn measure(&mut self, text: &str, style: &TextStyle) -> MarkshotResult<f64>;

    /// Draw `text` as one line at `origin` into `ctx`.
    fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        style: &TextStyle,
        origin: Point,
        baseline: Baseline,
        paint: TextPaint,
    ) -> MarkshotResult<()>;
}

impl<T: Typesetter + ?Sized> Typesetter for Box<T> {
    fn measure(&mut self, text: &str, style: &TextStyle) -> MarkshotResult<f64> {
        (**self).measure(text, style)
    }

    fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        style: &TextStyle,
        origin: Point,
        baseline: Baseline,
        paint: TextPaint,
    ) -> MarkshotResult<()> {
        (**self).draw(ctx, text, style, origin, baseline, paint)
    }
}
