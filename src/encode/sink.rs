use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MarkshotError, MarkshotResult};
use crate::render::surface::FrameRGBA;

/// Configuration provided to a [`VideoSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Negotiated output mime type.
    pub mime: String,
}

/// Sink contract for turning composited frames into an encoded byte stream.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order between
/// one `begin` and one `end` (or `abort`).
pub trait VideoSink: Send {
    /// Whether this sink can produce `mime`. Must be answerable before `begin`.
    fn is_type_supported(&self, mime: &str) -> bool;
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> MarkshotResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MarkshotResult<()>;
    /// Finalize and return the encoded stream. Blocks until the encoder is done.
    fn end(&mut self) -> MarkshotResult<Vec<u8>>;
    /// Release everything after a cancelled or failed job. No artifact is produced.
    fn abort(&mut self);
}

/// In-memory sink for tests and debugging.
///
/// The "encoded" stream returned by `end` is the raw RGBA8 frames back to back.
#[derive(Debug, Default)]
pub struct InMemorySink {
    supported: Option<Vec<String>>,
    cfg: Option<SinkConfig>,
    /// Frames in push order.
    pub(crate) frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Sink accepting every mime type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink accepting only the listed mime types (exact, case-insensitive).
    pub fn supporting<I, S>(mimes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported: Some(mimes.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` completed.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether `abort` was called.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl VideoSink for InMemorySink {
    fn is_type_supported(&self, mime: &str) -> bool {
        match &self.supported {
            None => true,
            Some(list) => list.iter().any(|m| m.eq_ignore_ascii_case(mime)),
        }
    }

    fn begin(&mut self, cfg: SinkConfig) -> MarkshotResult<()> {
        if !self.is_type_supported(&cfg.mime) {
            return Err(MarkshotError::UnsupportedEncoder {
                candidates: vec![cfg.mime],
            });
        }
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MarkshotResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| MarkshotError::encode("in-memory sink not started"))?;
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(MarkshotError::encode(
                "in-memory sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(MarkshotError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> MarkshotResult<Vec<u8>> {
        if self.cfg.take().is_none() {
            return Err(MarkshotError::encode("in-memory sink not started"));
        }
        self.ended = true;
        Ok(self
            .frames
            .iter()
            .flat_map(|(_, f)| f.data.iter().copied())
            .collect())
    }

    fn abort(&mut self) {
        self.cfg = None;
        self.frames.clear();
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
