use super::*;
use crate::foundation::core::{Canvas, Rgba8};

#[test]
fn premul_over_opaque_src_replaces_dst() {
    let mut dst = vec![10u8, 20, 30, 255];
    premul_over_in_place(&mut dst, &[200, 100, 50, 255]).unwrap();
    assert_eq!(dst, vec![200, 100, 50, 255]);
}

#[test]
fn premul_over_transparent_src_is_identity() {
    let mut dst = vec![10u8, 20, 30, 255];
    premul_over_in_place(&mut dst, &[0, 0, 0, 0]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn premul_over_half_black_darkens() {
    let mut dst = vec![200u8, 200, 200, 255];
    premul_over_in_place(&mut dst, &[0, 0, 0, 128]).unwrap();
    assert_eq!(dst, vec![100, 100, 100, 255]);
}

#[test]
fn premul_over_rejects_length_mismatch() {
    let mut dst = vec![0u8; 8];
    assert!(premul_over_in_place(&mut dst, &[0u8; 4]).is_err());
}

#[test]
fn bezpath_conversion_preserves_elements() {
    let mut p = BezPath::new();
    p.move_to((0.0, 0.0));
    p.line_to((4.0, 0.0));
    p.quad_to((5.0, 1.0), (4.0, 2.0));
    p.close_path();
    let cpu = bezpath_to_cpu(&p);
    assert_eq!(cpu.elements().len(), 4);
}

#[test]
fn draw_over_fills_rect_region_only() {
    let mut surface = RenderSurface::new(Canvas {
        width: 8,
        height: 8,
    })
    .unwrap();
    surface.fill(Rgba8::rgb(255, 255, 255));
    let mut raster = Rasterizer::new();
    raster
        .draw_over(&mut surface, |ctx| {
            ctx.set_paint(Rgba8::rgb(0, 0, 0).to_cpu());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 4.0, 8.0));
            Ok(())
        })
        .unwrap();
    assert_eq!(surface.pixel(1, 4), Some([0, 0, 0, 255]));
    assert_eq!(surface.pixel(6, 4), Some([255, 255, 255, 255]));
}

#[test]
fn draw_errors_propagate_and_leave_surface_untouched() {
    let mut surface = RenderSurface::new(Canvas {
        width: 2,
        height: 2,
    })
    .unwrap();
    let before = surface.clone();
    let mut raster = Rasterizer::new();
    let res = raster.draw_over(&mut surface, |_| Err(MarkshotError::render("nope")));
    assert!(res.is_err());
    assert_eq!(surface, before);
}
