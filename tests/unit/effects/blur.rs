use super::*;
use crate::foundation::core::{Canvas, Rgba8};

fn surface(w: u32, h: u32) -> RenderSurface {
    RenderSurface::new(Canvas {
        width: w,
        height: h,
    })
    .unwrap()
}

#[test]
fn kernel_radius_covers_three_sigma() {
    assert_eq!(kernel_radius(0.0), 0);
    assert_eq!(kernel_radius(0.1), 1);
    assert_eq!(kernel_radius(1.0), 3);
    assert_eq!(kernel_radius(2.2), 7);
}

#[test]
fn kernel_is_normalized_for_any_sigma() {
    for sigma in [0.05, 0.4, 0.8, 1.1, 2.2, 6.0] {
        let k = GaussianKernel::new(sigma).unwrap();
        assert_eq!(k.weight_sum(), 65536, "sigma {sigma}");
        assert_eq!(k.radius(), kernel_radius(sigma) as usize);
    }
    assert!(GaussianKernel::new(0.0).is_none());
    assert!(GaussianKernel::new(-1.0).is_none());
    assert!(GaussianKernel::new(f64::NAN).is_none());
}

#[test]
fn constant_image_is_unchanged() {
    let (w, h) = (4u32, 3u32);
    let mut px = [10u8, 20, 30, 40].repeat((w * h) as usize);
    let before = px.clone();
    let k = GaussianKernel::new(2.0).unwrap();
    SurfaceBlur::new().blur_pixels(&mut px, w, h, &k).unwrap();
    assert_eq!(px, before);
}

#[test]
fn single_pixel_spreads_and_keeps_its_energy() {
    let (w, h) = (5u32, 5u32);
    let mut px = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    px[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let k = GaussianKernel::new(0.6).unwrap();
    SurfaceBlur::new().blur_pixels(&mut px, w, h, &k).unwrap();

    let nonzero = px.chunks_exact(4).filter(|p| p[3] != 0).count();
    assert!(nonzero > 1);
    assert!(px[center + 3] < 255);
    let sum_a: u32 = px.chunks_exact(4).map(|p| u32::from(p[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 12);
}

#[test]
fn mismatched_buffer_is_rejected() {
    let k = GaussianKernel::new(1.0).unwrap();
    assert!(SurfaceBlur::new().blur_pixels(&mut [0u8; 12], 2, 2, &k).is_err());
}

#[test]
fn zero_radius_is_noop() {
    let mut s = surface(3, 3);
    s.fill(Rgba8::rgb(9, 8, 7));
    s.data_mut()[16..20].copy_from_slice(&[255, 255, 255, 255]);
    let before = s.clone();
    let mut blur = SurfaceBlur::new();
    blur.apply(&mut s, 0.0).unwrap();
    assert_eq!(s, before);
    assert_eq!(blur.scratch_len(), 0);
}

#[test]
fn softens_hard_edge_and_stays_opaque() {
    let mut s = surface(8, 1);
    s.fill(Rgba8::rgb(0, 0, 0));
    for x in 4..8 {
        let i = x * 4;
        s.data_mut()[i..i + 3].copy_from_slice(&[255, 255, 255]);
    }
    SurfaceBlur::new().apply(&mut s, 1.0).unwrap();
    let left = s.pixel(3, 0).unwrap();
    let right = s.pixel(4, 0).unwrap();
    assert!(left[0] > 0 && left[0] < 255);
    assert!(right[0] > 0 && right[0] < 255);
    assert!(s.data().chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn blur_is_separable_along_both_axes() {
    let mut s = surface(1, 8);
    s.fill(Rgba8::rgb(0, 0, 0));
    for y in 4..8 {
        let i = y * 4;
        s.data_mut()[i..i + 3].copy_from_slice(&[255, 255, 255]);
    }
    SurfaceBlur::new().apply(&mut s, 1.0).unwrap();
    let above = s.pixel(0, 3).unwrap();
    assert!(above[0] > 0 && above[0] < 255);
}

#[test]
fn scratch_is_reused_across_frames() {
    let mut blur = SurfaceBlur::new();
    for shade in [40u8, 120, 200] {
        let mut s = surface(16, 9);
        s.fill(Rgba8::rgb(shade, shade, shade));
        blur.apply(&mut s, 0.8).unwrap();
        assert_eq!(blur.scratch_len(), 16 * 9 * 4);
        assert_eq!(s.pixel(7, 4).unwrap(), [shade, shade, shade, 255]);
    }
}
