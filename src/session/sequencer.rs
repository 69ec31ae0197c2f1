use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::Rng;

use crate::config::job::{FrameState, VideoJobConfig};
use crate::encode::mime::{EncodedArtifact, artifact_filename, select_mime};
use crate::encode::sink::{SinkConfig, VideoSink};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{MarkshotError, MarkshotResult};
use crate::render::pipeline::{ComposedFrame, FrameCompositor};
use crate::session::clock::{Clock, SystemClock};
use crate::text::Typesetter;

/// Frames produced by a preview.
pub const PREVIEW_FRAMES: u64 = 10;
/// Pause after each preview frame.
pub const PREVIEW_DELAY: Duration = Duration::from_millis(70);

/// How frame production is aligned with time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep a fixed amount after every frame.
    FixedDelay(Duration),
    /// Sleep until `start + (i + 1) * interval` after frame `i`; never sleep when already late.
    Deadline {
        /// Target frame interval.
        interval: Duration,
    },
    /// Produce frames as fast as possible.
    Unpaced,
}

/// Where a job currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Negotiating the encoder and starting the sink.
    Preparing,
    /// Producing frames.
    Rendering,
    /// Waiting for the sink to finish encoding.
    Finalizing,
    /// Done.
    Complete,
}

/// One progress report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Current stage.
    pub stage: Stage,
    /// Frames completed so far.
    pub frame: u64,
    /// Frames in the job.
    pub total: u64,
    /// Human-readable status line.
    pub label: String,
}

/// Shared flag for cancelling a running job between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect before the next frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Timing summary of a finished render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames handed to the sink.
    pub frames: u64,
    /// Time from the first frame to sink finalization.
    pub elapsed: Duration,
    /// Largest lateness of a frame against its deadline.
    pub max_drift: Duration,
    /// Negotiated mime type.
    pub mime: String,
}

/// A finished render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOutcome {
    /// The encoded video.
    pub artifact: EncodedArtifact,
    /// Timing summary.
    pub stats: RenderStats,
}

/// Drives the compositor once per frame and paces the loop.
///
/// Every frame is composed on a fresh surface; the RNG passed to [`FrameSequencer::preview`] or
/// [`FrameSequencer::render`] is the only state advancing between frames.
pub struct FrameSequencer<T, C = SystemClock> {
    compositor: FrameCompositor<T>,
    clock: C,
    paced: bool,
    cancel: CancelToken,
}

impl<T: Typesetter> FrameSequencer<T, SystemClock> {
    /// Sequencer on the wall clock.
    pub fn new(typesetter: T) -> Self {
        Self::with_clock(typesetter, SystemClock::new())
    }
}

impl<T: Typesetter, C: Clock> FrameSequencer<T, C> {
    /// Sequencer on a custom clock.
    pub fn with_clock(typesetter: T, clock: C) -> Self {
        Self {
            compositor: FrameCompositor::new(typesetter),
            clock,
            paced: true,
            cancel: CancelToken::new(),
        }
    }

    /// Disable all pacing (offline rendering).
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    /// Use `token` for cancellation.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// The clock used for pacing.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The cancellation token checked before each frame.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Pacing applied to previews.
    pub fn preview_pacing(&self) -> Pacing {
        if self.paced {
            Pacing::FixedDelay(PREVIEW_DELAY)
        } else {
            Pacing::Unpaced
        }
    }

    /// Pacing applied to renders of `job`.
    pub fn render_pacing(&self, job: &VideoJobConfig) -> Pacing {
        if self.paced {
            Pacing::Deadline {
                interval: job.fps.frame_interval(),
            }
        } else {
            Pacing::Unpaced
        }
    }

    /// Produce [`PREVIEW_FRAMES`] frames without encoding and return the last one.
    pub fn preview<R, P>(
        &mut self,
        canvas: Canvas,
        state: &FrameState,
        rng: &mut R,
        mut progress: P,
    ) -> MarkshotResult<ComposedFrame>
    where
        R: Rng + ?Sized,
        P: FnMut(Progress),
    {
        let pacing = self.preview_pacing();
        let mut timer = PaceTimer::new(pacing, self.clock.now());
        let mut last = None;
        for i in 0..PREVIEW_FRAMES {
            if self.cancel.is_cancelled() {
                return Err(MarkshotError::Cancelled);
            }
            let composed = self.compositor.compose(canvas, state, rng)?;
            tracing::debug!(
                frame = i,
                rects = composed.phrase.rects.len(),
                "preview frame"
            );
            progress(Progress {
                stage: Stage::Rendering,
                frame: i + 1,
                total: PREVIEW_FRAMES,
                label: format!("Preview frame {}/{}", i + 1, PREVIEW_FRAMES),
            });
            last = Some(composed);
            timer.pace(&self.clock, i);
        }
        progress(Progress {
            stage: Stage::Complete,
            frame: PREVIEW_FRAMES,
            total: PREVIEW_FRAMES,
            label: "Preview done.".to_owned(),
        });
        last.ok_or_else(|| MarkshotError::render("preview produced no frames"))
    }

    /// Render `job.total_frames` frames into `sink` and return the encoded artifact.
    ///
    /// The mime type is negotiated before the sink is started; if no candidate is supported the
    /// call fails with [`MarkshotError::UnsupportedEncoder`] and nothing is rendered. Any failure
    /// or cancellation after `begin` aborts the sink.
    #[tracing::instrument(
        skip_all,
        fields(
            width = job.canvas.width,
            height = job.canvas.height,
            fps = job.fps.num,
            frames = job.total_frames
        )
    )]
    pub fn render<R, P>(
        &mut self,
        job: &VideoJobConfig,
        state: &FrameState,
        sink: &mut dyn VideoSink,
        rng: &mut R,
        mut progress: P,
    ) -> MarkshotResult<RenderOutcome>
    where
        R: Rng + ?Sized,
        P: FnMut(Progress),
    {
        let total = job.total_frames;
        let Some(mime) = select_mime(job.mime_candidates.as_slice(), |m| {
            sink.is_type_supported(m)
        }) else {
            tracing::warn!(candidates = ?job.mime_candidates, "no supported encoder");
            return Err(MarkshotError::UnsupportedEncoder {
                candidates: job.mime_candidates.clone(),
            });
        };
        let mime = mime.to_owned();

        progress(Progress {
            stage: Stage::Preparing,
            frame: 0,
            total,
            label: format!("Preparing {mime}"),
        });
        sink.begin(SinkConfig {
            width: job.canvas.width,
            height: job.canvas.height,
            fps: job.fps,
            mime: mime.clone(),
        })?;
        tracing::info!(%mime, "render started");

        let start = self.clock.now();
        let max_drift = match self.render_frames(job, state, sink, rng, &mut progress) {
            Ok(drift) => drift,
            Err(e) => {
                sink.abort();
                if matches!(e, MarkshotError::Cancelled) {
                    tracing::info!("render cancelled");
                } else {
                    tracing::warn!(error = %e, "render failed, sink aborted");
                }
                return Err(e);
            }
        };

        progress(Progress {
            stage: Stage::Finalizing,
            frame: total,
            total,
            label: format!("Finalizing {mime}"),
        });
        let bytes = sink.end()?;
        let elapsed = self.clock.now().saturating_sub(start);
        tracing::info!(
            elapsed_ms = elapsed.as_millis() as u64,
            bytes = bytes.len(),
            max_drift_ms = max_drift.as_millis() as u64,
            "render finished"
        );
        progress(Progress {
            stage: Stage::Complete,
            frame: total,
            total,
            label: format!(
                "Done. Frames: {total}, elapsed: {:.2}s, mime: {mime}",
                elapsed.as_secs_f64()
            ),
        });

        Ok(RenderOutcome {
            artifact: EncodedArtifact {
                suggested_filename: artifact_filename(job.canvas, job.duration_ms(), &mime),
                mime: mime.clone(),
                bytes,
            },
            stats: RenderStats {
                frames: total,
                elapsed,
                max_drift,
                mime,
            },
        })
    }

    fn render_frames<R, P>(
        &mut self,
        job: &VideoJobConfig,
        state: &FrameState,
        sink: &mut dyn VideoSink,
        rng: &mut R,
        progress: &mut P,
    ) -> MarkshotResult<Duration>
    where
        R: Rng + ?Sized,
        P: FnMut(Progress),
    {
        let total = job.total_frames;
        let mut timer = PaceTimer::new(self.render_pacing(job), self.clock.now());
        for i in 0..total {
            if self.cancel.is_cancelled() {
                return Err(MarkshotError::Cancelled);
            }
            let composed = self.compositor.compose(job.canvas, state, rng)?;
            sink.push_frame(FrameIndex(i), &composed.frame)?;
            tracing::debug!(frame = i, rects = composed.phrase.rects.len(), "frame pushed");
            progress(Progress {
                stage: Stage::Rendering,
                frame: i + 1,
                total,
                label: format!("Rendering {}/{} @ {}fps", i + 1, total, job.fps.num),
            });
            timer.pace(&self.clock, i);
        }
        Ok(timer.max_drift)
    }
}

/// Applies a [`Pacing`] policy after each frame and tracks lateness.
struct PaceTimer {
    pacing: Pacing,
    start: Duration,
    max_drift: Duration,
    warned: bool,
}

impl PaceTimer {
    fn new(pacing: Pacing, start: Duration) -> Self {
        Self {
            pacing,
            start,
            max_drift: Duration::ZERO,
            warned: false,
        }
    }

    fn pace<C: Clock + ?Sized>(&mut self, clock: &C, frame: u64) {
        match self.pacing {
            Pacing::Unpaced => {}
            Pacing::FixedDelay(d) => clock.sleep(d),
            Pacing::Deadline { interval } => {
                let slots = u32::try_from(frame + 1).unwrap_or(u32::MAX);
                let deadline = self.start + interval.saturating_mul(slots);
                let now = clock.now();
                if now < deadline {
                    clock.sleep(deadline - now);
                    return;
                }
                let drift = now - deadline;
                self.max_drift = self.max_drift.max(drift);
                if drift > interval && !self.warned {
                    self.warned = true;
                    tracing::warn!(
                        frame,
                        drift_ms = drift.as_millis() as u64,
                        interval_ms = interval.as_millis() as u64,
                        "frame production is falling behind the target fps"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/sequencer.rs"]
mod tests;
