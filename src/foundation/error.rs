/// Convenience result type used across markshot.
pub type MarkshotResult<T> = Result<T, MarkshotError>;

/// Top-level error taxonomy used by the rendering and encoding APIs.
#[derive(thiserror::Error, Debug)]
pub enum MarkshotError {
    /// Invalid user-provided configuration or frame data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while compositing a frame (text shaping, rasterization, surface sizing).
    #[error("render error: {0}")]
    Render(String),

    /// Errors reported by a video sink while encoding.
    #[error("encode error: {0}")]
    Encode(String),

    /// None of the requested mime types is supported by the encoding backend.
    #[error("no supported video encoder for any of: {}", candidates.join(", "))]
    UnsupportedEncoder {
        /// Candidates that were tried, most preferred first.
        candidates: Vec<String>,
    },

    /// The render job was cancelled between frames.
    #[error("render cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MarkshotError {
    /// Build a [`MarkshotError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MarkshotError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MarkshotError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
