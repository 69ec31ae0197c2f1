use super::*;
use crate::foundation::core::Rgba8;
use crate::render::raster::Rasterizer;

fn system_typesetter() -> Option<ParleyTypesetter> {
    let files = discover_font_files()?;
    ParleyTypesetter::from_font_files(&files).ok()
}

#[test]
fn empty_font_list_is_rejected() {
    assert!(ParleyTypesetter::from_font_files(&[]).is_err());
}

#[test]
fn garbage_bytes_are_rejected() {
    assert!(ParleyTypesetter::from_bytes(vec![0u8; 16], None).is_err());
}

#[test]
fn measure_is_monotonic_in_text_length() {
    let Some(mut ts) = system_typesetter() else {
        return;
    };
    let style = TextStyle::regular(32.0);
    let short = ts.measure("why", &style).unwrap();
    let long = ts.measure("why are we here", &style).unwrap();
    assert!(short > 0.0);
    assert!(long > short);
    assert_eq!(ts.measure("", &style).unwrap(), 0.0);
}

#[test]
fn invalid_size_is_rejected() {
    let Some(mut ts) = system_typesetter() else {
        return;
    };
    assert!(ts.measure("x", &TextStyle::regular(0.0)).is_err());
}

#[test]
fn missing_bold_face_is_emboldened_by_weight() {
    let style = |weight| TextStyle {
        size_px: 50.0,
        weight,
    };
    assert_eq!(embolden_width(&style(400), false), None);
    assert_eq!(embolden_width(&style(600), true), None);

    let w600 = embolden_width(&style(600), false).unwrap();
    let w700 = embolden_width(&style(700), false).unwrap();
    let w800 = embolden_width(&style(800), false).unwrap();
    assert!((w600 - 0.5).abs() < 1e-9);
    assert!(w600 < w700 && w700 < w800);
}

#[test]
fn single_face_draws_heavier_at_higher_weight() {
    let Some(files) = discover_font_files() else {
        return;
    };
    let Ok(mut ts) = ParleyTypesetter::from_font_files(&files[..1]) else {
        return;
    };
    let mut raster = Rasterizer::new();
    let mut ink = |ts: &mut ParleyTypesetter, weight| -> u64 {
        let style = TextStyle {
            size_px: 40.0,
            weight,
        };
        let layer = raster
            .render_layer(160, 60, |ctx| {
                ts.draw(
                    ctx,
                    "Hello",
                    &style,
                    Point::new(4.0, 4.0),
                    Baseline::Top,
                    TextPaint::Fill(Rgba8::rgb(0, 0, 0)),
                )
            })
            .unwrap();
        layer.chunks_exact(4).map(|px| u64::from(px[3])).sum()
    };
    let regular = ink(&mut ts, 400);
    let heavy = ink(&mut ts, 800);
    assert!(regular > 0);
    assert!(heavy > regular);
}
