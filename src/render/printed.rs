use rand::Rng;

use crate::foundation::core::{Canvas, Point, Rgba8};
use crate::foundation::error::MarkshotResult;
use crate::foundation::math::{choose, uniform};
use crate::render::raster::Rasterizer;
use crate::render::surface::RenderSurface;
use crate::text::{Baseline, TextPaint, TextStyle, Typesetter, wrap_words};

/// Decorative filler paragraphs. Content is irrelevant to layout correctness.
pub const FILLER_CORPUS: &[&str] = &[
    "В данном обзоре исследуется происхождение и значение фразы в литературе и искусстве.",
    "От древних мифов до современных картин — этот вопрос появляется снова и снова.",
    "С точки зрения психологии, поиски смысла жизни часто начинаются с простого вопроса.",
    "Наблюдение, внимание к деталям и случайность иногда приводят к открытиям.",
    "Язык — странный инструмент: он одновременно скрывает и раскрывает мысль.",
    "The question resurfaces in letters, margins and the backs of old photographs.",
    "Most notes are written quickly and read slowly, long after the moment has passed.",
];

/// Upper bound on paragraphs per frame.
pub const MAX_PARAGRAPHS: usize = 10;

const INK: Rgba8 = Rgba8 {
    r: 0,
    g: 0,
    b: 0,
    a: 140,
};
const LINE_JITTER_PX: f64 = 4.0;

/// One wrapped line and its top-left origin.
#[derive(Clone, Debug, PartialEq)]
pub struct PrintedLine {
    /// Line text.
    pub text: String,
    /// Top-left corner (`Baseline::Top`).
    pub origin: Point,
}

/// A filler paragraph laid out for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PrintedParagraph {
    /// Font style of every line.
    pub style: TextStyle,
    /// Paragraph opacity in `[0.18, 0.38)`.
    pub opacity: f64,
    /// Wrapped lines, top to bottom.
    pub lines: Vec<PrintedLine>,
}

/// Lay out up to [`MAX_PARAGRAPHS`] filler paragraphs, stopping once the cursor passes `0.85h`.
pub fn plan_printed_noise<T, R>(
    canvas: Canvas,
    typesetter: &mut T,
    rng: &mut R,
) -> MarkshotResult<Vec<PrintedParagraph>>
where
    T: Typesetter + ?Sized,
    R: Rng + ?Sized,
{
    let (w, h) = (canvas.w(), canvas.h());
    let margin_x = w * 0.10;
    let max_width = w - margin_x * 2.0;
    let mut y = h * 0.12;
    let mut paragraphs = Vec::new();

    for _ in 0..MAX_PARAGRAPHS {
        let Some(text) = choose(rng, FILLER_CORPUS) else {
            break;
        };
        let style = TextStyle::regular((h * uniform(rng, 0.020, 0.026)).round().max(1.0));
        let line_h = (style.size_px * 1.25).round();
        let opacity = uniform(rng, 0.18, 0.38);

        let wrapped = wrap_words(text, max_width, |s| typesetter.measure(s, &style))?;
        let mut lines = Vec::with_capacity(wrapped.len());
        for text in wrapped {
            let x = margin_x + uniform(rng, -LINE_JITTER_PX, LINE_JITTER_PX);
            lines.push(PrintedLine {
                text,
                origin: Point::new(x, y),
            });
            y += line_h;
        }
        paragraphs.push(PrintedParagraph {
            style,
            opacity,
            lines,
        });

        y += line_h * uniform(rng, 0.7, 1.5);
        if y > h * 0.85 {
            break;
        }
    }
    Ok(paragraphs)
}

/// Overlay faint filler paragraphs on the surface.
pub fn draw_printed_noise<T, R>(
    surface: &mut RenderSurface,
    raster: &mut Rasterizer,
    typesetter: &mut T,
    rng: &mut R,
) -> MarkshotResult<()>
where
    T: Typesetter + ?Sized,
    R: Rng + ?Sized,
{
    let paragraphs = plan_printed_noise(surface.canvas(), typesetter, rng)?;
    tracing::trace!(paragraphs = paragraphs.len(), "printed noise planned");

    raster.draw_over(surface, |ctx| {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for para in &paragraphs {
            ctx.push_opacity_layer(para.opacity as f32);
            for line in &para.lines {
                typesetter.draw(
                    ctx,
                    &line.text,
                    &para.style,
                    line.origin,
                    Baseline::Top,
                    TextPaint::Fill(INK),
                )?;
            }
            ctx.pop_layer();
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/printed.rs"]
mod tests;
