use crate::foundation::error::{MarkshotError, MarkshotResult};
use crate::render::surface::RenderSurface;

const Q16_ONE: u32 = 1 << 16;
const Q16_HALF: u32 = 1 << 15;

/// Kernel half-width covering three standard deviations.
pub fn kernel_radius(sigma: f64) -> u32 {
    if sigma <= 0.0 {
        0
    } else {
        (sigma * 3.0).ceil().max(1.0) as u32
    }
}

/// A normalized 1D Gaussian in Q16 fixed point.
///
/// Only the centre tap and one side are stored; the kernel is symmetric.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GaussianKernel {
    half: Vec<u32>,
}

impl GaussianKernel {
    /// Kernel with standard deviation `sigma`, spanning [`kernel_radius`] taps on each side.
    ///
    /// `None` unless `sigma` is finite and positive.
    pub fn new(sigma: f64) -> Option<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return None;
        }
        let radius = kernel_radius(sigma) as usize;
        let falloff = -0.5 / (sigma * sigma);
        let raw: Vec<f64> = (0..=radius)
            .map(|i| ((i * i) as f64 * falloff).exp())
            .collect();
        let total = raw[0] + 2.0 * raw[1..].iter().sum::<f64>();

        let mut half: Vec<u32> = raw
            .iter()
            .map(|w| (w / total * f64::from(Q16_ONE)).round() as u32)
            .collect();
        // Rounding residue goes to the centre so the taps sum to exactly one.
        let sides: u32 = half[1..].iter().sum();
        half[0] = Q16_ONE.saturating_sub(2 * sides);
        Some(Self { half })
    }

    /// Taps on each side of the centre.
    pub fn radius(&self) -> usize {
        self.half.len() - 1
    }

    /// Sum of all taps in Q16; `65536` for every kernel this type builds.
    pub fn weight_sum(&self) -> u32 {
        self.half[0] + 2 * self.half[1..].iter().sum::<u32>()
    }
}

/// Separable Gaussian blur over premultiplied RGBA8, with edge pixels repeated.
///
/// Owns the intermediate buffer between the horizontal and vertical passes, so a compositor
/// holding one blurs every frame without allocating once the buffer has grown to frame size.
#[derive(Debug, Default)]
pub struct SurfaceBlur {
    scratch: Vec<u8>,
}

impl SurfaceBlur {
    /// Blur with an empty scratch buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blur the whole surface in place, treating `radius_px` as the standard deviation.
    ///
    /// The surface content is moved to the scratch buffer by the horizontal pass and written back
    /// by the vertical pass, replacing what was there. Radii `<= 0` leave the surface untouched.
    pub fn apply(&mut self, surface: &mut RenderSurface, radius_px: f64) -> MarkshotResult<()> {
        let Some(kernel) = GaussianKernel::new(radius_px) else {
            return Ok(());
        };
        let (width, height) = (surface.width(), surface.height());
        self.blur_pixels(surface.data_mut(), width, height, &kernel)
    }

    /// Blur a tightly packed `width x height` premultiplied buffer in place.
    pub fn blur_pixels(
        &mut self,
        pixels: &mut [u8],
        width: u32,
        height: u32,
        kernel: &GaussianKernel,
    ) -> MarkshotResult<()> {
        let (w, h) = (width as usize, height as usize);
        let expected = w
            .checked_mul(h)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| MarkshotError::render("blur buffer size overflow"))?;
        if pixels.len() != expected {
            return Err(MarkshotError::render(format!(
                "blur expects {expected} bytes for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        if expected == 0 {
            return Ok(());
        }

        self.scratch.resize(expected, 0);
        // Rows: pixels step by 1, lines by `w`. Columns: pixels step by `w`, lines by 1.
        convolve(pixels, &mut self.scratch, Lines::rows(w, h), &kernel.half);
        convolve(&self.scratch, pixels, Lines::columns(w, h), &kernel.half);
        Ok(())
    }

    /// Bytes currently held by the scratch buffer.
    pub fn scratch_len(&self) -> usize {
        self.scratch.len()
    }
}

/// How one pass walks the buffer, in pixel units.
#[derive(Clone, Copy)]
struct Lines {
    count: usize,
    len: usize,
    line_step: usize,
    px_step: usize,
}

impl Lines {
    fn rows(w: usize, h: usize) -> Self {
        Self {
            count: h,
            len: w,
            line_step: w,
            px_step: 1,
        }
    }

    fn columns(w: usize, h: usize) -> Self {
        Self {
            count: w,
            len: h,
            line_step: 1,
            px_step: w,
        }
    }
}

fn convolve(src: &[u8], dst: &mut [u8], lines: Lines, half: &[u32]) {
    let last = lines.len - 1;
    for line in 0..lines.count {
        let base = line * lines.line_step;
        let at = |j: usize| (base + j * lines.px_step) * 4;
        for j in 0..lines.len {
            let c = at(j);
            let mut acc = [0u32; 4];
            for (ch, a) in acc.iter_mut().enumerate() {
                *a = half[0] * u32::from(src[c + ch]);
            }
            for (k, &wk) in half.iter().enumerate().skip(1) {
                let lo = at(j.saturating_sub(k));
                let hi = at((j + k).min(last));
                for (ch, a) in acc.iter_mut().enumerate() {
                    *a += wk * (u32::from(src[lo + ch]) + u32::from(src[hi + ch]));
                }
            }
            for (ch, a) in acc.iter().enumerate() {
                dst[c + ch] = ((a + Q16_HALF) >> 16).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
