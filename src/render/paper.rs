use rand::Rng;

use crate::foundation::core::{BezPath, Canvas, Point, Rgba8};
use crate::foundation::error::MarkshotResult;
use crate::foundation::math::{mul_div255_u8, uniform};
use crate::render::raster::{Rasterizer, bezpath_to_cpu};
use crate::render::surface::RenderSurface;

/// Flat base tone of the paper.
pub const PAPER_TONE: Rgba8 = Rgba8::rgb(0xf4, 0xf2, 0xee);
/// Darkening reached at the vignette's outer radius.
pub const VIGNETTE_MAX_ALPHA: f64 = 0.12;
/// Fold strokes drawn per frame.
pub const FOLD_COUNT: usize = 6;
/// Samples per fold, spaced `w / FOLD_SEGMENTS` apart.
pub const FOLD_SEGMENTS: usize = 6;
/// Maximum vertical wobble of a fold sample.
pub const FOLD_JITTER_PX: f64 = 18.0;

const FOLD_LAYER_OPACITY: f32 = 0.20;
const FOLD_INK: Rgba8 = Rgba8 {
    r: 0,
    g: 0,
    b: 0,
    a: 31,
};

/// Radial darkening centred at `(0.5w, 0.45h)`, transparent inside `inner` and reaching
/// [`VIGNETTE_MAX_ALPHA`] at `outer`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vignette {
    /// Gradient centre.
    pub center: Point,
    /// Radius where the darkening starts.
    pub inner: f64,
    /// Radius where the darkening saturates.
    pub outer: f64,
}

impl Vignette {
    /// Vignette geometry for a canvas.
    pub fn for_canvas(canvas: Canvas) -> Self {
        let (w, h) = (canvas.w(), canvas.h());
        Self {
            center: Point::new(w * 0.5, h * 0.45),
            inner: w.min(h) * 0.05,
            outer: w.max(h) * 0.75,
        }
    }

    /// Straight alpha of the black overlay at `p`.
    pub fn alpha_at(&self, p: Point) -> f64 {
        let span = self.outer - self.inner;
        if span <= 0.0 {
            return VIGNETTE_MAX_ALPHA;
        }
        let t = ((p.distance(self.center) - self.inner) / span).clamp(0.0, 1.0);
        VIGNETTE_MAX_ALPHA * t
    }
}

/// One wavy fold: a polyline across the full width.
#[derive(Clone, Debug, PartialEq)]
pub struct FoldStroke {
    /// Polyline vertices, left to right.
    pub points: Vec<Point>,
}

impl FoldStroke {
    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut it = self.points.iter();
        if let Some(first) = it.next() {
            path.move_to(*first);
            for p in it {
                path.line_to(*p);
            }
        }
        path
    }
}

/// Sample the [`FOLD_COUNT`] fold polylines for one frame.
pub fn plan_folds<R: Rng + ?Sized>(canvas: Canvas, rng: &mut R) -> Vec<FoldStroke> {
    let (w, h) = (canvas.w(), canvas.h());
    let step = w / FOLD_SEGMENTS as f64;
    (0..FOLD_COUNT)
        .map(|_| {
            let y0 = uniform(rng, h * 0.1, h * 0.9);
            let mut points = Vec::with_capacity(FOLD_SEGMENTS + 2);
            points.push(Point::new(0.0, y0));
            for i in 0..=FOLD_SEGMENTS {
                let y = y0 + uniform(rng, -FOLD_JITTER_PX, FOLD_JITTER_PX);
                points.push(Point::new(i as f64 * step, y));
            }
            FoldStroke { points }
        })
        .collect()
}

/// Darken the surface in place with the radial vignette.
pub fn apply_vignette(surface: &mut RenderSurface) {
    let vignette = Vignette::for_canvas(surface.canvas());
    let width = surface.width() as usize;
    for (i, px) in surface.data_mut().chunks_exact_mut(4).enumerate() {
        let x = (i % width) as f64 + 0.5;
        let y = (i / width) as f64 + 0.5;
        let a = (vignette.alpha_at(Point::new(x, y)) * 255.0).round() as u16;
        if a == 0 {
            continue;
        }
        let inv = 255 - a;
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), inv);
        }
        px[3] = (a as u8).saturating_add(mul_div255_u8(u16::from(px[3]), inv));
    }
}

/// Overwrite the whole surface with paper: base tone, vignette, then faint folds.
pub fn draw_paper_background<R: Rng + ?Sized>(
    surface: &mut RenderSurface,
    raster: &mut Rasterizer,
    rng: &mut R,
) -> MarkshotResult<()> {
    surface.fill(PAPER_TONE);
    apply_vignette(surface);

    let folds = plan_folds(surface.canvas(), rng);
    raster.draw_over(surface, |ctx| {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(FOLD_INK.to_cpu());
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(1.0));
        ctx.push_opacity_layer(FOLD_LAYER_OPACITY);
        for fold in &folds {
            ctx.stroke_path(&bezpath_to_cpu(&fold.to_path()));
        }
        ctx.pop_layer();
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/paper.rs"]
mod tests;
