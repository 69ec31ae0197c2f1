use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::OnceLock;
use std::thread::JoinHandle;

use crate::encode::mime::{Container, MimeType};
use crate::encode::sink::{SinkConfig, VideoSink};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MarkshotError, MarkshotResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// `ffmpeg` executable, looked up on `PATH` unless absolute.
    pub program: PathBuf,
    /// Target video bitrate passed as `-b:v`.
    pub bitrate: String,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            bitrate: "6M".to_owned(),
            bg_rgba: [255, 255, 255, 255],
        }
    }
}

type Drain = JoinHandle<std::io::Result<Vec<u8>>>;

/// Sink that spawns the system `ffmpeg`, streams raw frames to its stdin and collects the
/// encoded container from its stdout.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoders: OnceLock<BTreeSet<String>>,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<Drain>,
    stderr_drain: Option<Drain>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a sink; `ffmpeg` is not touched until the first query or `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoders: OnceLock::new(),
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Video encoders the local `ffmpeg` reports. Empty when `ffmpeg` cannot be run.
    pub fn available_encoders(&self) -> &BTreeSet<String> {
        self.encoders.get_or_init(|| {
            let probed = probe_encoders(&self.opts.program);
            if let Err(e) = &probed {
                tracing::warn!(error = %e, "ffmpeg encoder probe failed");
            }
            probed.unwrap_or_default()
        })
    }

    fn encoder_for(&self, mime: &MimeType) -> Option<&'static str> {
        let available = self.available_encoders();
        encoder_candidates(mime)
            .iter()
            .copied()
            .find(|e| available.contains(*e))
    }

    fn reset(&mut self) {
        self.child = None;
        self.stdin = None;
        self.stdout_drain = None;
        self.stderr_drain = None;
        self.cfg = None;
        self.last_idx = None;
    }
}

impl VideoSink for FfmpegSink {
    fn is_type_supported(&self, mime: &str) -> bool {
        MimeType::parse(mime).is_ok_and(|m| self.encoder_for(&m).is_some())
    }

    fn begin(&mut self, cfg: SinkConfig) -> MarkshotResult<()> {
        if self.child.is_some() {
            return Err(MarkshotError::encode("ffmpeg sink already started"));
        }
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(MarkshotError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(MarkshotError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(MarkshotError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }

        let mime = MimeType::parse(&cfg.mime)?;
        let encoder = self
            .encoder_for(&mime)
            .ok_or_else(|| MarkshotError::UnsupportedEncoder {
                candidates: vec![cfg.mime.clone()],
            })?;

        let mut cmd = Command::new(&self.opts.program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args(output_args(&cfg, &mime, encoder, &self.opts.bitrate));
        tracing::debug!(?cmd, "spawning ffmpeg");

        let mut child = cmd.spawn().map_err(|e| {
            MarkshotError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MarkshotError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MarkshotError::encode("failed to open ffmpeg stdout (unexpected)"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MarkshotError::encode("failed to open ffmpeg stderr (unexpected)"))?;

        let len = (cfg.width as usize)
            .checked_mul(cfg.height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| MarkshotError::validation("frame size overflow"))?;
        self.scratch = vec![0u8; len];
        self.stdout_drain = Some(drain(stdout));
        self.stderr_drain = Some(drain(stderr));
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MarkshotResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| MarkshotError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(MarkshotError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(MarkshotError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(MarkshotError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.opts.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(MarkshotError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            MarkshotError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> MarkshotResult<Vec<u8>> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| MarkshotError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            MarkshotError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stdout_bytes = join_drain(self.stdout_drain.take(), "stdout")?;
        let stderr_bytes = join_drain(self.stderr_drain.take(), "stderr")?;
        self.reset();

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(MarkshotError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        if stdout_bytes.is_empty() {
            return Err(MarkshotError::encode("ffmpeg produced no output"));
        }
        Ok(stdout_bytes)
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::debug!(error = %e, "ffmpeg already exited");
            }
            let _ = child.wait();
        }
        let _ = join_drain(self.stdout_drain.take(), "stdout");
        let _ = join_drain(self.stderr_drain.take(), "stderr");
        self.reset();
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Drain {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(handle: Option<Drain>, what: &str) -> MarkshotResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| MarkshotError::encode(format!("ffmpeg {what} drain thread panicked")))?
            .map_err(|e| MarkshotError::encode(format!("ffmpeg {what} read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

/// `ffmpeg` encoder names able to produce `mime`, most preferred first.
pub fn encoder_candidates(mime: &MimeType) -> &'static [&'static str] {
    let codec = mime.codec.as_deref();
    match mime.container {
        Container::Webm => match codec {
            None => &["libvpx-vp9", "libvpx"],
            Some("vp9") => &["libvpx-vp9"],
            Some("vp8") => &["libvpx"],
            Some(c) if c.starts_with("vp09") => &["libvpx-vp9"],
            Some("av1") | Some("av01") => &["libsvtav1", "libaom-av1"],
            Some(_) => &[],
        },
        Container::Mp4 => match codec {
            None | Some("h264") => &["libx264"],
            Some(c) if c.starts_with("avc1") => &["libx264"],
            Some(_) => &[],
        },
    }
}

fn output_args(cfg: &SinkConfig, mime: &MimeType, encoder: &str, bitrate: &str) -> Vec<String> {
    let mut args: Vec<String> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect();
    args.push(format!("{}x{}", cfg.width, cfg.height));
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    args.push("-r".to_owned());
    args.push(fps_arg(cfg.fps));
    for a in ["-i", "pipe:0", "-an", "-c:v", encoder, "-b:v", bitrate] {
        args.push(a.to_owned());
    }
    args.extend(["-pix_fmt".to_owned(), "yuv420p".to_owned()]);
    match mime.container {
        // stdout is not seekable, so MP4 has to be fragmented.
        Container::Mp4 => args.extend(
            ["-movflags", "frag_keyframe+empty_moov", "-f", "mp4"]
                .iter()
                .map(|s| (*s).to_owned()),
        ),
        Container::Webm => args.extend(["-f".to_owned(), "webm".to_owned()]),
    }
    args.push("pipe:1".to_owned());
    args
}

fn fps_arg(fps: Fps) -> String {
    format!("{}/{}", fps.num, fps.den)
}

fn probe_encoders(program: &std::path::Path) -> MarkshotResult<BTreeSet<String>> {
    let out = Command::new(program)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| MarkshotError::encode(format!("failed to run ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(MarkshotError::encode(format!(
            "ffmpeg -encoders exited with status {}",
            out.status
        )));
    }
    Ok(parse_encoder_list(&String::from_utf8_lossy(&out.stdout)))
}

/// Video encoder names from `ffmpeg -encoders` output.
///
/// Entries follow the `------` separator as `<flags> <name> <description>`; video encoders have
/// `V` as the first flag.
pub fn parse_encoder_list(text: &str) -> BTreeSet<String> {
    text.lines()
        .skip_while(|l| !l.trim_start().starts_with("---"))
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let flags = fields.next()?;
            let name = fields.next()?;
            flags.starts_with('V').then(|| name.to_owned())
        })
        .collect()
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> MarkshotResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(MarkshotError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        for c in 0..3 {
            let fg = if src_is_premul {
                u16::from(s[c])
            } else {
                mul_div255_u16(u16::from(s[c]), a)
            };
            d[c] = (fg + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
