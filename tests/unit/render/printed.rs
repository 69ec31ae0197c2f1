use super::*;
use crate::render::paper::PAPER_TONE;
use crate::text::BoxTypesetter;
use rand::SeedableRng;
use rand::rngs::StdRng;

const CANVAS: Canvas = Canvas {
    width: 540,
    height: 960,
};

#[test]
fn paragraphs_respect_bounds_and_ranges() {
    for seed in 0..20 {
        let mut ts = BoxTypesetter;
        let paras = plan_printed_noise(CANVAS, &mut ts, &mut StdRng::seed_from_u64(seed)).unwrap();
        assert!(!paras.is_empty());
        assert!(paras.len() <= MAX_PARAGRAPHS);

        let h = CANVAS.h();
        for p in &paras {
            assert!((h * 0.020).round() <= p.style.size_px);
            assert!(p.style.size_px <= (h * 0.026).round());
            assert!((0.18..0.38).contains(&p.opacity));
            for line in &p.lines {
                assert!((line.origin.x - 54.0).abs() <= 4.0);
                assert!(!line.text.is_empty());
            }
        }
    }
}

#[test]
fn wrapped_lines_fit_the_margins() {
    let max_width = CANVAS.w() * 0.8;
    let mut ts = BoxTypesetter;
    let paras = plan_printed_noise(CANVAS, &mut ts, &mut StdRng::seed_from_u64(3)).unwrap();
    for p in &paras {
        for line in &p.lines {
            let width = ts.measure(&line.text, &p.style).unwrap();
            let single_word = !line.text.contains(' ');
            assert!(width <= max_width || single_word);
        }
    }
}

#[test]
fn lines_advance_downwards() {
    let mut ts = BoxTypesetter;
    let paras = plan_printed_noise(CANVAS, &mut ts, &mut StdRng::seed_from_u64(9)).unwrap();
    let ys: Vec<f64> = paras
        .iter()
        .flat_map(|p| p.lines.iter().map(|l| l.origin.y))
        .collect();
    assert!((ys[0] - CANVAS.h() * 0.12).abs() < 1e-9);
    assert!(ys.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn cursor_stops_before_bottom_band() {
    // Narrow enough that each paragraph wraps into many lines.
    let tiny = Canvas {
        width: 60,
        height: 400,
    };
    let mut ts = BoxTypesetter;
    let paras = plan_printed_noise(tiny, &mut ts, &mut StdRng::seed_from_u64(1)).unwrap();
    assert!(paras.len() < MAX_PARAGRAPHS);
}

#[test]
fn drawing_leaves_faint_ink_on_paper() {
    let mut s = RenderSurface::new(CANVAS).unwrap();
    s.fill(PAPER_TONE);
    let before = s.clone();
    let mut raster = Rasterizer::new();
    let mut ts = BoxTypesetter;
    draw_printed_noise(&mut s, &mut raster, &mut ts, &mut StdRng::seed_from_u64(4)).unwrap();

    assert_ne!(s, before);
    let darkest = s.data().chunks_exact(4).map(|px| px[0]).min().unwrap();
    // 0.55 ink at no more than 0.38 opacity never reaches full black.
    assert!(darkest > 120, "darkest = {darkest}");
    assert!(s.data().chunks_exact(4).all(|px| px[3] == 255));
}
