use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::Point;
use crate::foundation::error::{MarkshotError, MarkshotResult};
use crate::text::{Baseline, TextPaint, TextStyle, Typesetter};

/// Common locations of serif faces, regular first then bold, per platform.
const SERIF_FONT_CANDIDATES: &[(&str, Option<&str>)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
        Some("/usr/share/fonts/truetype/dejavu/DejaVuSerif-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/dejavu/DejaVuSerif.ttf",
        Some("/usr/share/fonts/dejavu/DejaVuSerif-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
        Some("/usr/share/fonts/truetype/liberation/LiberationSerif-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/liberation-serif/LiberationSerif-Regular.ttf",
        Some("/usr/share/fonts/liberation-serif/LiberationSerif-Bold.ttf"),
    ),
    (
        "/Library/Fonts/Times New Roman.ttf",
        Some("/Library/Fonts/Times New Roman Bold.ttf"),
    ),
    (
        "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
        Some("/System/Library/Fonts/Supplemental/Times New Roman Bold.ttf"),
    ),
    (
        "C:\\Windows\\Fonts\\times.ttf",
        Some("C:\\Windows\\Fonts\\timesbd.ttf"),
    ),
];

/// Search well-known system locations for a serif face (and its bold companion, if present).
pub fn discover_font_files() -> Option<Vec<PathBuf>> {
    SERIF_FONT_CANDIDATES.iter().find_map(|(regular, bold)| {
        let regular = Path::new(regular);
        if !regular.is_file() {
            return None;
        }
        let mut files = vec![regular.to_path_buf()];
        if let Some(bold) = bold.map(Path::new).filter(|p| p.is_file()) {
            files.push(bold.to_path_buf());
        }
        Some(files)
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
struct TextBrushRgba8 {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

/// One font file with its own Parley collection, so shaped glyph ids always index `data`.
struct FontFace {
    font_ctx: parley::FontContext,
    family: String,
    data: vello_cpu::peniko::FontData,
}

impl FontFace {
    fn from_bytes(bytes: Vec<u8>) -> MarkshotResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            MarkshotError::validation("no font families registered from font bytes")
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MarkshotError::validation("registered font family has no name"))?
            .to_string();
        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        Ok(Self {
            font_ctx,
            family,
            data,
        })
    }
}

/// [`Typesetter`] backed by real font files: Parley shapes, `vello_cpu` rasterizes glyph runs.
///
/// The first face is used for regular text; the second, if given, for weights of 600 and above.
pub struct ParleyTypesetter {
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    regular: FontFace,
    bold: Option<FontFace>,
}

impl ParleyTypesetter {
    /// Build from raw font bytes (regular face, optional bold face).
    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> MarkshotResult<Self> {
        if bold.is_none() {
            tracing::debug!("no bold face, weights >= 600 are emboldened with an outline");
        }
        Ok(Self {
            layout_ctx: parley::LayoutContext::new(),
            regular: FontFace::from_bytes(regular)?,
            bold: bold.map(FontFace::from_bytes).transpose()?,
        })
    }

    /// Build from font files: the first is the regular face, the second (if any) the bold face.
    pub fn from_font_files(paths: &[PathBuf]) -> MarkshotResult<Self> {
        let Some((first, rest)) = paths.split_first() else {
            return Err(MarkshotError::validation("at least one font file is required"));
        };
        let read = |p: &PathBuf| -> MarkshotResult<Vec<u8>> {
            Ok(std::fs::read(p).with_context(|| format!("read font '{}'", p.display()))?)
        };
        let regular = read(first)?;
        let bold = rest.first().map(read).transpose()?;
        tracing::debug!(
            regular = %first.display(),
            bold = ?rest.first().map(|p| p.display().to_string()),
            "loaded font faces"
        );
        Self::from_bytes(regular, bold)
    }

    /// Build from the first serif face found in well-known system locations.
    pub fn discover() -> MarkshotResult<Self> {
        let files = discover_font_files()
            .ok_or_else(|| MarkshotError::validation("no system serif font found"))?;
        Self::from_font_files(&files)
    }

    fn layout(
        &mut self,
        text: &str,
        style: &TextStyle,
    ) -> MarkshotResult<(parley::Layout<TextBrushRgba8>, vello_cpu::peniko::FontData)> {
        let size_px = style.size_px as f32;
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MarkshotError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let face = match self.bold.as_mut() {
            Some(bold) if style.weight >= 600 => bold,
            _ => &mut self.regular,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut face.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8::default()));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok((layout, face.data.clone()))
    }
}

impl Typesetter for ParleyTypesetter {
    fn measure(&mut self, text: &str, style: &TextStyle) -> MarkshotResult<f64> {
        if text.is_empty() {
            return Ok(0.0);
        }
        let (layout, _) = self.layout(text, style)?;
        Ok(f64::from(layout.full_width()))
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
        if text.is_empty() {
            return Ok(());
        }
        let (layout, font) = self.layout(text, style)?;
        let embolden = match paint {
            TextPaint::Fill(_) => embolden_width(style, self.bold.is_some()),
            TextPaint::Stroke { .. } => None,
        };

        let shift_y = match baseline {
            Baseline::Top => 0.0,
            Baseline::Alphabetic => layout
                .lines()
                .next()
                .map(|line| f64::from(line.metrics().baseline))
                .unwrap_or(0.0),
        };
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            origin.x,
            origin.y - shift_y,
        )));
        match paint {
            TextPaint::Fill(c) => ctx.set_paint(c.to_cpu()),
            TextPaint::Stroke { color, width } => {
                ctx.set_paint(color.to_cpu());
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
            }
        }

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs: Vec<vello_cpu::Glyph> = run
                    .positioned_glyphs()
                    .map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    })
                    .collect();
                let font_size = run.run().font_size();
                match paint {
                    TextPaint::Fill(_) => ctx
                        .glyph_run(&font)
                        .font_size(font_size)
                        .fill_glyphs(replay(&glyphs)),
                    TextPaint::Stroke { .. } => ctx
                        .glyph_run(&font)
                        .font_size(font_size)
                        .stroke_glyphs(replay(&glyphs)),
                }
                if let Some(width) = embolden {
                    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
                    ctx.glyph_run(&font)
                        .font_size(font_size)
                        .stroke_glyphs(replay(&glyphs));
                }
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

fn replay(glyphs: &[vello_cpu::Glyph]) -> impl Iterator<Item = vello_cpu::Glyph> + '_ {
    glyphs.iter().map(|g| vello_cpu::Glyph {
        id: g.id,
        x: g.x,
        y: g.y,
    })
}

/// Outline width that thickens a regular face to approximate `style.weight`.
///
/// `None` when a real bold face is loaded or the weight is below 600.
pub(crate) fn embolden_width(style: &TextStyle, has_bold: bool) -> Option<f64> {
    if has_bold || style.weight < 600 {
        return None;
    }
    let steps = f64::from(style.weight - 500) / 100.0;
    Some(style.size_px * 0.01 * steps)
}

#[cfg(test)]
#[path = "../../tests/unit/text/parley_engine.rs"]
mod tests;
