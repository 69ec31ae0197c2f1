use crate::foundation::core::Canvas;
use crate::foundation::error::{MarkshotError, MarkshotResult};

/// Output types tried in order when a job does not name its own.
pub const DEFAULT_MIME_CANDIDATES: &[&str] = &[
    "video/webm;codecs=vp9",
    "video/webm;codecs=vp8",
    "video/webm",
];

/// Output container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Container {
    /// Matroska-based WebM.
    Webm,
    /// ISO base media (fragmented when streamed).
    Mp4,
}

impl Container {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }
}

/// A parsed `video/<container>[;codecs=<codec>]` mime type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MimeType {
    /// Container named by the essence.
    pub container: Container,
    /// First codec of the `codecs` parameter, lowercased and unquoted.
    pub codec: Option<String>,
}

impl MimeType {
    /// Parse a video mime type. Only WebM and MP4 are understood.
    pub fn parse(mime: &str) -> MarkshotResult<Self> {
        let mut parts = mime.split(';');
        let essence = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let container = match essence.as_str() {
            "video/webm" => Container::Webm,
            "video/mp4" => Container::Mp4,
            _ => {
                return Err(MarkshotError::validation(format!(
                    "unsupported mime type \"{mime}\""
                )));
            }
        };

        let codec = parts
            .filter_map(|p| p.split_once('='))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case("codecs"))
            .and_then(|(_, v)| {
                v.trim()
                    .trim_matches('"')
                    .split(',')
                    .next()
                    .map(|c| c.trim().to_ascii_lowercase())
            })
            .filter(|c| !c.is_empty());

        Ok(Self { container, codec })
    }
}

/// First candidate `supported` accepts, in caller order.
pub fn select_mime<'a, S, F>(candidates: &'a [S], mut supported: F) -> Option<&'a str>
where
    S: AsRef<str>,
    F: FnMut(&str) -> bool,
{
    for candidate in candidates {
        let mime: &'a str = candidate.as_ref();
        if supported(mime) {
            return Some(mime);
        }
    }
    None
}

/// File extension for a mime type; `bin` for anything unrecognized.
pub fn extension_for(mime: &str) -> &'static str {
    MimeType::parse(mime)
        .map(|m| m.container.extension())
        .unwrap_or("bin")
}

/// `highlight_<w>x<h>_<ms>ms.<ext>`
pub fn artifact_filename(canvas: Canvas, duration_ms: u64, mime: &str) -> String {
    format!(
        "highlight_{}x{}_{}ms.{}",
        canvas.width,
        canvas.height,
        duration_ms,
        extension_for(mime)
    )
}

/// An encoded video ready to be written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedArtifact {
    /// Negotiated mime type.
    pub mime: String,
    /// Encoded byte stream.
    pub bytes: Vec<u8>,
    /// Suggested download name.
    pub suggested_filename: String,
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mime.rs"]
mod tests;
