use rand::Rng;

use crate::render::surface::RenderSurface;

/// Noise amplitude for a grain amount: `floor(255 * amount)`, with `amount` clamped to `[0,1]`.
pub fn grain_amplitude(amount: f64) -> u8 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    (255.0 * amount.min(1.0)).floor() as u8
}

/// Add independent uniform noise in `[-amp, amp]` to every color channel of every pixel.
///
/// Alpha is left alone and channels are clamped to `[0,255]`. An amount of `0` (or below) leaves
/// the surface bit-identical.
pub fn apply_grain<R: Rng + ?Sized>(surface: &mut RenderSurface, amount: f64, rng: &mut R) {
    let amp = i16::from(grain_amplitude(amount));
    if amp == 0 {
        return;
    }
    for px in surface.data_mut().chunks_exact_mut(4) {
        for c in &mut px[..3] {
            let n = rng.random_range(-amp..=amp);
            *c = (i16::from(*c) + n).clamp(0, 255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/grain.rs"]
mod tests;
