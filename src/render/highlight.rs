//! Highlighted phrase: occurrence search, marker geometry and drawing.
//!
//! Layout is pure geometry driven by a [`Typesetter`] and an injected RNG, so the exact rectangles
//! of a frame can be inspected without rasterizing anything. [`draw_phrase`] then paints a
//! [`PhraseLayout`] in three passes: marker rectangles, a soft drop shadow, and the sharp text.

use std::ops::Range;

use rand::Rng;

use crate::config::job::FrameState;
use crate::effects::blur::{GaussianKernel, SurfaceBlur};
use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::MarkshotResult;
use crate::foundation::math::{choose, uniform};
use crate::render::raster::{Rasterizer, affine_to_cpu, bezpath_to_cpu, premul_over_in_place};
use crate::render::surface::RenderSurface;
use crate::text::{Baseline, TextPaint, TextStyle, Typesetter};

/// Horizontal marker padding, in ems.
pub const PAD_X_EM: f64 = 0.18;
/// Vertical marker offset below the em box top, in ems.
pub const PAD_Y_EM: f64 = 0.28;
/// Marker height, in ems.
pub const RECT_HEIGHT_EM: f64 = 0.95;
/// Corner radius as a fraction of the marker height.
pub const CORNER_RADIUS_FRAC: f64 = 0.18;
/// Bound of the per-frame jitter on each axis.
pub const JITTER_PX: f64 = 6.0;
/// Candidate phrase weights.
pub const PHRASE_WEIGHTS: [u16; 3] = [600, 700, 800];

const TEXT_FILL: Rgba8 = Rgba8 {
    r: 0,
    g: 0,
    b: 0,
    a: 224,
};
const TEXT_STROKE: Rgba8 = Rgba8 {
    r: 0,
    g: 0,
    b: 0,
    a: 64,
};
const SHADOW_INK: Rgba8 = Rgba8::rgb(0, 0, 0);
const SHADOW_OPACITY: f32 = 0.18;

/// One match of a highlight target inside the phrase.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightOccurrence {
    /// Index of the target in the caller's highlight list.
    pub target_index: usize,
    /// Byte offset of the match in the trimmed phrase.
    pub start_offset: usize,
    /// Matched slice of the phrase, original casing.
    pub matched_text: String,
    /// Measured width of the phrase before the match.
    pub pixel_offset_x: f64,
    /// Measured width of the matched slice.
    pub pixel_width: f64,
}

/// A marker rectangle behind one occurrence.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightRect {
    /// The occurrence this marker covers.
    pub occurrence: HighlightOccurrence,
    /// Unrotated bounds.
    pub rect: Rect,
    /// Rotation about the rect centre, radians.
    pub rotation: f64,
    /// Fill opacity.
    pub opacity: f64,
    /// Corner radius after clamping to half the smaller side.
    pub corner_radius: f64,
}

impl HighlightRect {
    /// Rotation about the rectangle's own centre.
    pub fn transform(&self) -> Affine {
        Affine::rotate_about(self.rotation, self.rect.center())
    }

    /// Rounded outline in unrotated coordinates.
    pub fn path(&self) -> BezPath {
        use kurbo::Shape as _;
        kurbo::RoundedRect::from_rect(self.rect, self.corner_radius).to_path(0.1)
    }
}

/// Drop shadow under the phrase text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowParams {
    /// Canvas-style shadow blur; the Gaussian sigma is half of it.
    pub blur: f64,
    /// Shadow offset.
    pub offset: Vec2,
}

/// Everything needed to draw the phrase of one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PhraseLayout {
    /// Trimmed phrase text.
    pub text: String,
    /// Unjittered alphabetic-baseline anchor.
    pub anchor: Point,
    /// Phrase font style.
    pub style: TextStyle,
    /// Offset shared by the text and every marker.
    pub jitter: Vec2,
    /// Markers in draw order.
    pub rects: Vec<HighlightRect>,
    /// Marker fill color.
    pub color: Rgba8,
    /// Text shadow.
    pub shadow: ShadowParams,
}

impl PhraseLayout {
    /// Where the text baseline starts once jitter is applied.
    pub fn origin(&self) -> Point {
        self.anchor + self.jitter
    }

    /// Marker count for one target.
    pub fn rects_for(&self, target_index: usize) -> usize {
        self.rects
            .iter()
            .filter(|r| r.occurrence.target_index == target_index)
            .count()
    }
}

/// Byte ranges of every non-overlapping, case-insensitive occurrence of `target` in `phrase`.
///
/// Empty and whitespace-only targets never match. Ranges index the original `phrase`.
pub fn find_occurrences(phrase: &str, target: &str) -> Vec<Range<usize>> {
    if target.trim().is_empty() {
        return Vec::new();
    }
    let needle: String = target.chars().flat_map(fold_char).collect();

    // Folding can change byte lengths, so keep a map from folded bytes back to the phrase.
    let mut folded = String::with_capacity(phrase.len());
    let mut origin = Vec::with_capacity(phrase.len() + 1);
    for (i, ch) in phrase.char_indices() {
        for lc in fold_char(ch) {
            folded.push(lc);
            origin.resize(folded.len(), i);
        }
    }
    origin.push(phrase.len());

    let mut out = Vec::new();
    let mut cursor = 0;
    while let Some(found) = folded[cursor..].find(&needle) {
        let start = cursor + found;
        let end = start + needle.len();
        let range = origin[start]..origin[end];
        if !range.is_empty() {
            out.push(range);
        }
        cursor = end;
    }
    out
}

/// Context-free lowercase, with final sigma folded onto `σ` so word position never matters.
fn fold_char(ch: char) -> impl Iterator<Item = char> {
    ch.to_lowercase().map(|lc| if lc == 'ς' { 'σ' } else { lc })
}

/// Place the phrase and its markers for one frame.
///
/// When `state.highlights` is empty the whole phrase is the single target.
pub fn layout_phrase<T, R>(
    canvas: Canvas,
    state: &FrameState,
    typesetter: &mut T,
    rng: &mut R,
) -> MarkshotResult<PhraseLayout>
where
    T: Typesetter + ?Sized,
    R: Rng + ?Sized,
{
    let (w, h) = (canvas.w(), canvas.h());
    let anchor = Point::new(w * uniform(rng, 0.12, 0.22), h * uniform(rng, 0.18, 0.62));
    let size_px = (h * uniform(rng, 0.040, 0.060)).round().max(1.0);
    let weight = choose(rng, &PHRASE_WEIGHTS[..]).copied().unwrap_or(700);
    let style = TextStyle { size_px, weight };
    let jitter = Vec2::new(
        uniform(rng, -JITTER_PX, JITTER_PX),
        uniform(rng, -JITTER_PX, JITTER_PX),
    );

    let text = state.phrase.trim();
    let whole = [text.to_owned()];
    let targets: &[String] = if state.highlights.is_empty() {
        &whole[..]
    } else {
        state.highlights.as_slice()
    };

    let pad_x = size_px * PAD_X_EM;
    let pad_y = size_px * PAD_Y_EM;
    let rect_h = size_px * RECT_HEIGHT_EM;

    let mut rects = Vec::new();
    for (target_index, target) in targets.iter().enumerate() {
        for range in find_occurrences(text, target) {
            let before = typesetter.measure(&text[..range.start], &style)?;
            let matched = &text[range.clone()];
            let width = typesetter.measure(matched, &style)?;

            let x0 = anchor.x + before - pad_x + jitter.x;
            let y0 = anchor.y - size_px + pad_y + jitter.y;
            let rect = Rect::new(x0, y0, x0 + width + 2.0 * pad_x, y0 + rect_h);
            let opacity = uniform(rng, 0.85, 0.98);
            let rotation = uniform(rng, -0.03, 0.03);
            let corner_radius = (rect_h * CORNER_RADIUS_FRAC)
                .min(rect.width() / 2.0)
                .min(rect.height() / 2.0);

            rects.push(HighlightRect {
                occurrence: HighlightOccurrence {
                    target_index,
                    start_offset: range.start,
                    matched_text: matched.to_owned(),
                    pixel_offset_x: before,
                    pixel_width: width,
                },
                rect,
                rotation,
                opacity,
                corner_radius,
            });
        }
    }

    let shadow = ShadowParams {
        blur: uniform(rng, 0.0, 2.2),
        offset: Vec2::new(uniform(rng, -0.5, 0.5), uniform(rng, 0.2, 1.0)),
    };

    Ok(PhraseLayout {
        text: text.to_owned(),
        anchor,
        style,
        jitter,
        rects,
        color: state.color,
        shadow,
    })
}

/// Draw markers, then the shadowed, outlined phrase on top.
pub fn draw_phrase<T>(
    surface: &mut RenderSurface,
    raster: &mut Rasterizer,
    blur: &mut SurfaceBlur,
    typesetter: &mut T,
    layout: &PhraseLayout,
) -> MarkshotResult<()>
where
    T: Typesetter + ?Sized,
{
    raster.draw_over(surface, |ctx| {
        ctx.set_paint(layout.color.to_cpu());
        for r in &layout.rects {
            ctx.set_transform(affine_to_cpu(r.transform()));
            ctx.push_opacity_layer(r.opacity as f32);
            ctx.fill_path(&bezpath_to_cpu(&r.path()));
            ctx.pop_layer();
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    })?;

    if layout.text.is_empty() {
        return Ok(());
    }

    let stroke_width = (layout.style.size_px * 0.04).max(1.0);
    let origin = layout.origin();

    let (width, height) = (surface.width(), surface.height());
    let shadow_origin = origin + layout.shadow.offset;
    let mut shadow = raster.render_layer(width, height, |ctx| {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.push_opacity_layer(SHADOW_OPACITY);
        draw_text(
            ctx,
            typesetter,
            layout,
            shadow_origin,
            stroke_width,
            SHADOW_INK,
            SHADOW_INK,
        )?;
        ctx.pop_layer();
        Ok(())
    })?;
    if let Some(kernel) = GaussianKernel::new(layout.shadow.blur / 2.0) {
        blur.blur_pixels(&mut shadow, width, height, &kernel)?;
    }
    premul_over_in_place(surface.data_mut(), &shadow)?;

    raster.draw_over(surface, |ctx| {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        draw_text(ctx, typesetter, layout, origin, stroke_width, TEXT_STROKE, TEXT_FILL)
    })
}

fn draw_text<T>(
    ctx: &mut vello_cpu::RenderContext,
    typesetter: &mut T,
    layout: &PhraseLayout,
    origin: Point,
    stroke_width: f64,
    stroke: Rgba8,
    fill: Rgba8,
) -> MarkshotResult<()>
where
    T: Typesetter + ?Sized,
{
    typesetter.draw(
        ctx,
        &layout.text,
        &layout.style,
        origin,
        Baseline::Alphabetic,
        TextPaint::Stroke {
            color: stroke,
            width: stroke_width,
        },
    )?;
    typesetter.draw(
        ctx,
        &layout.text,
        &layout.style,
        origin,
        Baseline::Alphabetic,
        TextPaint::Fill(fill),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/highlight.rs"]
mod tests;
