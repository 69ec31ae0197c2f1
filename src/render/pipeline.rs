use rand::Rng;

use crate::config::job::FrameState;
use crate::effects::blur::SurfaceBlur;
use crate::effects::grain::apply_grain;
use crate::foundation::core::Canvas;
use crate::foundation::error::MarkshotResult;
use crate::render::highlight::{PhraseLayout, draw_phrase, layout_phrase};
use crate::render::paper::draw_paper_background;
use crate::render::printed::draw_printed_noise;
use crate::render::raster::Rasterizer;
use crate::render::surface::{FrameRGBA, RenderSurface};
use crate::text::Typesetter;

/// A finished frame plus the phrase geometry it was drawn with.
#[derive(Clone, Debug)]
pub struct ComposedFrame {
    /// Premultiplied pixels.
    pub frame: FrameRGBA,
    /// Phrase and marker geometry of this frame.
    pub phrase: PhraseLayout,
}

/// Composites frames on a fresh [`RenderSurface`] each time.
///
/// Stage order is fixed:
/// 1. paper background
/// 2. printed filler text
/// 3. blur (background only)
/// 4. highlighted phrase, sharp
/// 5. grain over everything
pub struct FrameCompositor<T> {
    raster: Rasterizer,
    blur: SurfaceBlur,
    typesetter: T,
}

impl<T: Typesetter> FrameCompositor<T> {
    /// Compositor drawing text through `typesetter`.
    pub fn new(typesetter: T) -> Self {
        Self {
            raster: Rasterizer::new(),
            blur: SurfaceBlur::new(),
            typesetter,
        }
    }

    /// Draw one complete frame. All randomness comes from `rng`.
    pub fn compose<R: Rng + ?Sized>(
        &mut self,
        canvas: Canvas,
        state: &FrameState,
        rng: &mut R,
    ) -> MarkshotResult<ComposedFrame> {
        let mut surface = RenderSurface::new(canvas)?;

        draw_paper_background(&mut surface, &mut self.raster, rng)?;
        draw_printed_noise(&mut surface, &mut self.raster, &mut self.typesetter, rng)?;
        self.blur.apply(&mut surface, state.blur_radius_px)?;

        let phrase = layout_phrase(canvas, state, &mut self.typesetter, rng)?;
        draw_phrase(
            &mut surface,
            &mut self.raster,
            &mut self.blur,
            &mut self.typesetter,
            &phrase,
        )?;

        apply_grain(&mut surface, state.grain_amount, rng);

        Ok(ComposedFrame {
            frame: surface.into_frame(),
            phrase,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
