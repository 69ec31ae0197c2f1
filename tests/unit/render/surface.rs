use super::*;

fn canvas(width: u32, height: u32) -> Canvas {
    Canvas { width, height }
}

#[test]
fn new_surface_is_transparent() {
    let s = RenderSurface::new(canvas(3, 2)).unwrap();
    assert_eq!(s.data().len(), 3 * 2 * 4);
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn rejects_empty_and_oversized() {
    assert!(RenderSurface::new(canvas(0, 10)).is_err());
    assert!(RenderSurface::new(canvas(10, MAX_SURFACE_EDGE + 1)).is_err());
}

#[test]
fn fill_clear_and_pixel_access() {
    let mut s = RenderSurface::new(canvas(2, 2)).unwrap();
    s.fill(Rgba8::rgb(0xf4, 0xf2, 0xee));
    assert_eq!(s.pixel(1, 1), Some([0xf4, 0xf2, 0xee, 255]));
    assert_eq!(s.pixel(2, 0), None);
    s.clear();
    assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn frame_conversion_keeps_bytes() {
    let mut s = RenderSurface::new(canvas(2, 1)).unwrap();
    s.fill(Rgba8::rgb(1, 2, 3));
    let copy = s.to_frame();
    let owned = s.into_frame();
    assert_eq!(copy, owned);
    assert!(owned.premultiplied);
    assert_eq!(owned.data, vec![1, 2, 3, 255, 1, 2, 3, 255]);
}
