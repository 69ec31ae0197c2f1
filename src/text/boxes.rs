use crate::foundation::core::Point;
use crate::foundation::error::MarkshotResult;
use crate::text::{Baseline, TextPaint, TextStyle, Typesetter};

/// Font-less typesetter with fixed advances; every non-space character is drawn as a solid cell.
///
/// Each character advances `0.5 * size` (`0.55 * size` at weight 700 and above). Used when no
/// font file is available and wherever exact, font-independent geometry is wanted.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoxTypesetter;

impl BoxTypesetter {
    /// Horizontal advance of one character under `style`.
    pub fn advance(style: &TextStyle) -> f64 {
        let k = if style.weight >= 700 { 0.55 } else { 0.5 };
        style.size_px * k
    }
}

impl Typesetter for BoxTypesetter {
    fn measure(&mut self, text: &str, style: &TextStyle) -> MarkshotResult<f64> {
        Ok(text.chars().count() as f64 * Self::advance(style))
    }

    fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        style: &TextStyle,
        origin: Point,
        baseline: Baseline,
        paint: TextPaint,
    ) -> MarkshotResult<()> {
        use vello_cpu::kurbo::Shape as _;

        let adv = Self::advance(style);
        let size = style.size_px;
        let (top, bottom) = match baseline {
            Baseline::Alphabetic => (origin.y - 0.7 * size, origin.y),
            Baseline::Top => (origin.y + 0.2 * size, origin.y + 0.9 * size),
        };

        match paint {
            TextPaint::Fill(c) => ctx.set_paint(c.to_cpu()),
            TextPaint::Stroke { color, width } => {
                ctx.set_paint(color.to_cpu());
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
            }
        }

        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = origin.x + i as f64 * adv + adv * 0.1;
            let cell = vello_cpu::kurbo::Rect::new(x0, top, x0 + adv * 0.8, bottom);
            match paint {
                TextPaint::Fill(_) => ctx.fill_rect(&cell),
                TextPaint::Stroke { .. } => ctx.stroke_path(&cell.to_path(0.1)),
            }
        }
        Ok(())
    }
}
