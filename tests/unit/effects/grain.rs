use super::*;
use crate::foundation::core::{Canvas, Rgba8};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn gray_surface(v: u8) -> RenderSurface {
    let mut s = RenderSurface::new(Canvas {
        width: 16,
        height: 16,
    })
    .unwrap();
    s.fill(Rgba8::rgb(v, v, v));
    s
}

#[test]
fn zero_grain_is_bit_identical() {
    let mut s = gray_surface(128);
    let before = s.clone();
    let mut rng = StdRng::seed_from_u64(3);
    apply_grain(&mut s, 0.0, &mut rng);
    assert_eq!(s, before);
    apply_grain(&mut s, -0.5, &mut rng);
    assert_eq!(s, before);
    apply_grain(&mut s, 0.001, &mut rng);
    assert_eq!(s, before);
}

#[test]
fn grain_changes_are_bounded_by_amplitude() {
    let g = 0.1;
    let amp = i16::from(grain_amplitude(g));
    assert_eq!(amp, 25);
    let mut s = gray_surface(128);
    let before = s.clone();
    apply_grain(&mut s, g, &mut StdRng::seed_from_u64(11));
    assert_ne!(s, before);
    for (a, b) in s.data().chunks_exact(4).zip(before.data().chunks_exact(4)) {
        for c in 0..3 {
            assert!((i16::from(a[c]) - i16::from(b[c])).abs() <= amp);
        }
        assert_eq!(a[3], 255);
    }
}

#[test]
fn grain_clamps_at_channel_limits() {
    for v in [0u8, 255u8] {
        let mut s = gray_surface(v);
        apply_grain(&mut s, 1.0, &mut StdRng::seed_from_u64(5));
        assert!(s.data().chunks_exact(4).all(|px| px[3] == 255));
    }
}

#[test]
fn channels_receive_independent_noise() {
    let mut s = gray_surface(128);
    apply_grain(&mut s, 0.5, &mut StdRng::seed_from_u64(21));
    let decorrelated = s
        .data()
        .chunks_exact(4)
        .filter(|px| px[0] != px[1] || px[1] != px[2])
        .count();
    assert!(decorrelated > 200);
}

#[test]
fn amplitude_floors_and_clamps() {
    assert_eq!(grain_amplitude(1.0), 255);
    assert_eq!(grain_amplitude(2.0), 255);
    assert_eq!(grain_amplitude(0.5), 127);
    assert_eq!(grain_amplitude(f64::NAN), 0);
}
