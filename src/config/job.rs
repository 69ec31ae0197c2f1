use std::path::Path;

use anyhow::Context as _;

use crate::config::surface::SurfaceConfig;
use crate::encode::mime::DEFAULT_MIME_CANDIDATES;
use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{MarkshotError, MarkshotResult};

/// Video duration used when the raw value does not parse.
pub const DEFAULT_DURATION_SECS: f64 = 2.0;
/// Shortest accepted video duration.
pub const MIN_DURATION_SECS: f64 = 0.1;
/// Frame rate used when the raw value does not parse.
pub const DEFAULT_FPS: u32 = 30;
/// Lowest accepted frame rate.
pub const MIN_FPS: u32 = 10;
/// Highest accepted frame rate.
pub const MAX_FPS: u32 = 60;
/// Grain amount used when the raw value does not parse.
pub const DEFAULT_GRAIN: f64 = 0.06;
/// Background blur radius used when the raw value does not parse.
pub const DEFAULT_BLUR_PX: f64 = 0.8;
/// Highlight fill used when the raw value does not parse.
pub const DEFAULT_COLOR: Rgba8 = Rgba8::rgb(0xff, 0xe1, 0x4d);

/// A raw scalar as a host would hand it over: free text or an already-typed number.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Numeric JSON value.
    Number(f64),
    /// Text as typed into a form field.
    Text(String),
}

impl RawValue {
    /// Decimal value; text contributes its leading number, so `"2s"` reads as `2`.
    fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => float_prefix(s),
        };
        v.filter(|v| v.is_finite())
    }

    /// Whole value; text contributes its leading digits, so `"45fps"` and `"29.97"` read as
    /// `45` and `29`.
    fn as_whole(&self) -> Option<f64> {
        let v = match self {
            Self::Number(v) => Some(v.trunc()),
            Self::Text(s) => int_prefix(s),
        };
        v.filter(|v| v.is_finite())
    }

    fn as_text(&self) -> String {
        match self {
            Self::Number(v) => v.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// Highlight targets in raw form: one comma-separated string or an explicit list.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RawHighlights {
    /// `"why, here"`
    Joined(String),
    /// `["why", "here"]`
    List(Vec<String>),
}

impl RawHighlights {
    fn targets(&self) -> Vec<String> {
        match self {
            Self::Joined(s) => split_highlights(s),
            Self::List(items) => items
                .iter()
                .flat_map(|s| split_highlights(s))
                .collect(),
        }
    }
}

/// Untrusted job options, as collected from a form, CLI flags or a JSON job file.
///
/// Nothing here is validated; [`JobOptions::resolve`] applies fallbacks and produces the
/// immutable per-job values.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobOptions {
    /// Phrase drawn on top of the highlights.
    pub phrase: Option<String>,
    /// Case-insensitive substrings of the phrase to highlight.
    pub highlights: Option<RawHighlights>,
    /// Highlight fill color (`#RRGGBB`).
    pub color: Option<String>,
    /// Video duration in seconds.
    pub duration: Option<RawValue>,
    /// Frames per second.
    pub fps: Option<RawValue>,
    /// `WxH` surface size.
    pub resolution: Option<String>,
    /// Grain amount in `[0,1]`.
    pub grain: Option<RawValue>,
    /// Background blur radius in pixels.
    pub blur: Option<RawValue>,
    /// Preferred output mime types, most preferred first.
    pub mime_candidates: Option<Vec<String>>,
    /// Seed for deterministic output.
    pub seed: Option<u64>,
}

impl JobOptions {
    /// Load options from a JSON job file.
    pub fn from_path(path: &Path) -> MarkshotResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read job file '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Parse options from JSON text.
    pub fn from_json_str(text: &str) -> MarkshotResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| MarkshotError::validation(format!("invalid job options: {e}")))
    }

    /// Overlay `other` on top of `self`: every field set in `other` wins.
    pub fn merged_with(self, other: JobOptions) -> JobOptions {
        JobOptions {
            phrase: other.phrase.or(self.phrase),
            highlights: other.highlights.or(self.highlights),
            color: other.color.or(self.color),
            duration: other.duration.or(self.duration),
            fps: other.fps.or(self.fps),
            resolution: other.resolution.or(self.resolution),
            grain: other.grain.or(self.grain),
            blur: other.blur.or(self.blur),
            mime_candidates: other.mime_candidates.or(self.mime_candidates),
            seed: other.seed.or(self.seed),
        }
    }

    /// Resolve into immutable per-job values. Never fails: malformed fields fall back.
    ///
    /// `prior` is the surface size kept when the resolution string does not parse.
    pub fn resolve(&self, prior: SurfaceConfig) -> ResolvedJob {
        let surface = match self.resolution.as_deref() {
            Some(res) => prior.with_resolution(res),
            None => prior,
        };

        let color = match self.color.as_deref() {
            None => DEFAULT_COLOR,
            Some(raw) => Rgba8::from_hex(raw).unwrap_or_else(|e| {
                tracing::warn!(color = raw, error = %e, "unparsable color, using default");
                DEFAULT_COLOR
            }),
        };

        let duration_secs = resolve_number(
            self.duration.as_ref(),
            "duration",
            RawValue::as_f64,
            DEFAULT_DURATION_SECS,
        )
        .max(MIN_DURATION_SECS);
        let fps = clamp_fps(resolve_number(
            self.fps.as_ref(),
            "fps",
            RawValue::as_whole,
            f64::from(DEFAULT_FPS),
        ));
        let grain = resolve_number(self.grain.as_ref(), "grain", RawValue::as_f64, DEFAULT_GRAIN);
        let blur = resolve_number(self.blur.as_ref(), "blur", RawValue::as_f64, DEFAULT_BLUR_PX);

        let frame = FrameState::new(
            self.phrase.as_deref().unwrap_or_default(),
            self.highlights
                .as_ref()
                .map(RawHighlights::targets)
                .unwrap_or_default(),
            color,
        )
        .with_blur(blur)
        .with_grain(grain);

        let mime_candidates = self
            .mime_candidates
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| {
                DEFAULT_MIME_CANDIDATES
                    .iter()
                    .map(|s| (*s).to_owned())
                    .collect()
            });

        let video = VideoJobConfig {
            canvas: surface.canvas(),
            fps,
            duration_secs,
            total_frames: total_frames(duration_secs, fps),
            mime_candidates,
        };

        ResolvedJob {
            surface,
            frame,
            video,
            seed: self.seed,
        }
    }
}

/// Everything a preview or render invocation needs, resolved once up front.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedJob {
    /// Surface dimensions.
    pub surface: SurfaceConfig,
    /// Per-frame drawing inputs.
    pub frame: FrameState,
    /// Video timing and encoding preferences.
    pub video: VideoJobConfig,
    /// Seed for deterministic output, if requested.
    pub seed: Option<u64>,
}

/// Immutable inputs shared by every frame of one invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameState {
    /// Trimmed phrase.
    pub phrase: String,
    /// Highlight targets in draw order. Empty means "highlight the whole phrase".
    pub highlights: Vec<String>,
    /// Highlight fill color.
    pub color: Rgba8,
    /// Background blur radius in pixels, `>= 0`.
    pub blur_radius_px: f64,
    /// Grain amount in `[0,1]`.
    pub grain_amount: f64,
}

impl FrameState {
    /// New frame state with no blur and no grain.
    pub fn new(phrase: &str, highlights: Vec<String>, color: Rgba8) -> Self {
        Self {
            phrase: phrase.trim().to_owned(),
            highlights,
            color,
            blur_radius_px: 0.0,
            grain_amount: 0.0,
        }
    }

    /// Set the background blur radius, clamped to `>= 0`.
    pub fn with_blur(mut self, px: f64) -> Self {
        self.blur_radius_px = if px.is_finite() { px.max(0.0) } else { 0.0 };
        self
    }

    /// Set the grain amount, clamped to `[0,1]`.
    pub fn with_grain(mut self, amount: f64) -> Self {
        self.grain_amount = if amount.is_finite() {
            amount.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}

/// Timing and encoding parameters of one render job.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoJobConfig {
    /// Frame dimensions.
    pub canvas: Canvas,
    /// Frame rate, within `[MIN_FPS, MAX_FPS]`.
    pub fps: Fps,
    /// Requested duration in seconds, `>= MIN_DURATION_SECS`.
    pub duration_secs: f64,
    /// `round(duration_secs * fps)`, always `>= 1`.
    pub total_frames: u64,
    /// Output mime types, most preferred first.
    pub mime_candidates: Vec<String>,
}

impl VideoJobConfig {
    /// Build a validated job config with the default mime candidates.
    pub fn new(canvas: Canvas, fps: u32, duration_secs: f64) -> MarkshotResult<Self> {
        if !(MIN_FPS..=MAX_FPS).contains(&fps) {
            return Err(MarkshotError::validation(format!(
                "fps must be within [{MIN_FPS}, {MAX_FPS}], got {fps}"
            )));
        }
        if !duration_secs.is_finite() || duration_secs < MIN_DURATION_SECS {
            return Err(MarkshotError::validation(format!(
                "duration must be >= {MIN_DURATION_SECS}s, got {duration_secs}"
            )));
        }
        if canvas.width == 0 || canvas.height == 0 {
            return Err(MarkshotError::validation("canvas must be non-empty"));
        }
        let fps = Fps::whole(fps)?;
        Ok(Self {
            canvas,
            fps,
            duration_secs,
            total_frames: total_frames(duration_secs, fps),
            mime_candidates: DEFAULT_MIME_CANDIDATES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        })
    }

    /// Duration in whole milliseconds, as used in artifact file names.
    pub fn duration_ms(&self) -> u64 {
        (self.duration_secs * 1000.0).round() as u64
    }
}

/// Split a comma-separated highlight field into trimmed, non-empty targets.
pub fn split_highlights(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

fn total_frames(duration_secs: f64, fps: Fps) -> u64 {
    fps.secs_to_frames_round(duration_secs).max(1)
}

fn clamp_fps(raw: f64) -> Fps {
    let fps = (raw.trunc() as i64).clamp(i64::from(MIN_FPS), i64::from(MAX_FPS)) as u32;
    Fps { num: fps, den: 1 }
}

fn resolve_number(
    raw: Option<&RawValue>,
    field: &str,
    read: fn(&RawValue) -> Option<f64>,
    default: f64,
) -> f64 {
    let Some(raw) = raw else {
        return default;
    };
    match read(raw) {
        Some(v) => v,
        None => {
            tracing::warn!(
                field,
                value = %raw.as_text(),
                default,
                "unparsable numeric option, using default"
            );
            default
        }
    }
}

fn digit_run(b: &[u8]) -> usize {
    b.iter().take_while(|c| c.is_ascii_digit()).count()
}

fn sign_len(b: &[u8]) -> usize {
    usize::from(matches!(b.first(), Some(b'+' | b'-')))
}

/// Leading `[sign]digits` after whitespace.
fn int_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let sign = sign_len(b);
    let digits = digit_run(&b[sign..]);
    if digits == 0 {
        return None;
    }
    s[..sign + digits].parse().ok()
}

/// Leading decimal number (sign, digits, fraction, exponent) after whitespace.
fn float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let mut end = sign_len(b);
    let int = digit_run(&b[end..]);
    end += int;
    let mut frac = 0;
    if b.get(end) == Some(&b'.') {
        frac = digit_run(&b[end + 1..]);
        if int + frac > 0 {
            end += 1 + frac;
        }
    }
    if int + frac == 0 {
        return None;
    }
    if matches!(b.get(end), Some(b'e' | b'E')) {
        let exp_start = end + 1 + sign_len(&b[end + 1..]);
        let exp = digit_run(&b[exp_start..]);
        if exp > 0 {
            end = exp_start + exp;
        }
    }
    s[..end].parse().ok()
}

#[cfg(test)]
#[path = "../../tests/unit/config/job.rs"]
mod tests;
