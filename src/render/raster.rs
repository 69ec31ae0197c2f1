use crate::foundation::core::{Affine, BezPath};
use crate::foundation::error::{MarkshotError, MarkshotResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};
use crate::render::surface::RenderSurface;

/// Reusable `vello_cpu` context plus a scratch pixmap for vector and glyph drawing.
///
/// `vello_cpu` renders into a fresh buffer, so every draw renders into the scratch pixmap and is
/// then premul-over composited onto the destination surface.
#[derive(Default)]
pub struct Rasterizer {
    ctx: Option<vello_cpu::RenderContext>,
    scratch: Option<vello_cpu::Pixmap>,
}

impl Rasterizer {
    /// New rasterizer; contexts are allocated lazily at the first draw.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw with `f` into a transparent layer and composite it over `surface`.
    pub fn draw_over<F>(&mut self, surface: &mut RenderSurface, f: F) -> MarkshotResult<()>
    where
        F: FnOnce(&mut vello_cpu::RenderContext) -> MarkshotResult<()>,
    {
        let (width, height) = (surface.width(), surface.height());
        self.with_layer(width, height, f, |layer| {
            premul_over_in_place(surface.data_mut(), layer)
        })
    }

    /// Draw with `f` into a transparent layer and return its premultiplied bytes.
    pub fn render_layer<F>(&mut self, width: u32, height: u32, f: F) -> MarkshotResult<Vec<u8>>
    where
        F: FnOnce(&mut vello_cpu::RenderContext) -> MarkshotResult<()>,
    {
        self.with_layer(width, height, f, |layer| Ok(layer.to_vec()))
    }

    fn with_layer<F, G, T>(&mut self, width: u32, height: u32, f: F, g: G) -> MarkshotResult<T>
    where
        F: FnOnce(&mut vello_cpu::RenderContext) -> MarkshotResult<()>,
        G: FnOnce(&[u8]) -> MarkshotResult<T>,
    {
        let w: u16 = width
            .try_into()
            .map_err(|_| MarkshotError::render("layer width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| MarkshotError::render("layer height exceeds u16"))?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        let mut scratch = match self.scratch.take() {
            Some(pm) if pm.width() == w && pm.height() == h => pm,
            _ => vello_cpu::Pixmap::new(w, h),
        };
        scratch.data_as_u8_slice_mut().fill(0);

        let drawn = f(&mut ctx);
        let out = drawn.and_then(|()| {
            ctx.flush();
            ctx.render_to_pixmap(&mut scratch);
            g(scratch.data_as_u8_slice())
        });

        self.ctx = Some(ctx);
        self.scratch = Some(scratch);
        out
    }
}

/// Source-over composite of premultiplied `src` onto premultiplied `dst`.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> MarkshotResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(MarkshotError::render(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = s[3] as u16;
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - sa;
        d[3] = add_sat_u8(sa as u8, mul_div255_u8(d[3] as u16, inv));
        for c in 0..3 {
            let dc = mul_div255_u8(d[c] as u16, inv);
            d[c] = add_sat_u8(s[c], dc);
        }
    }
    Ok(())
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
