use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use markshot::config::job::{RawHighlights, RawValue};
use markshot::session::sequencer::{Progress, Stage};
use markshot::{
    BoxTypesetter, FfmpegSink, FfmpegSinkOpts, FrameRGBA, FrameSequencer, JobOptions,
    ParleyTypesetter, ResolvedJob, SurfaceConfig, Typesetter,
};

#[derive(Parser, Debug)]
#[command(name = "markshot", version, about = "Photographed-note video synthesizer")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render 10 quick preview frames and save the last one as a PNG.
    Preview(PreviewArgs),
    /// Render the full video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// JSON job file; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Phrase drawn on top of the highlights.
    #[arg(long)]
    phrase: Option<String>,

    /// Comma-separated substrings to highlight (empty: the whole phrase).
    #[arg(long)]
    highlight: Option<String>,

    /// Highlight color, `#RRGGBB`.
    #[arg(long)]
    color: Option<String>,

    /// Duration in seconds.
    #[arg(long)]
    duration: Option<String>,

    /// Frames per second (10-60).
    #[arg(long)]
    fps: Option<String>,

    /// Output size as `WxH`.
    #[arg(long)]
    resolution: Option<String>,

    /// Grain amount in [0,1].
    #[arg(long)]
    grain: Option<String>,

    /// Background blur radius in pixels.
    #[arg(long)]
    blur: Option<String>,

    /// Preferred output mime type; repeat to list fallbacks in order.
    #[arg(long = "mime")]
    mime: Vec<String>,

    /// Font file; the first is the regular face, the second the bold face.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Do not pace frames against the clock.
    #[arg(long, default_value_t = false)]
    no_pacing: bool,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output PNG path.
    #[arg(long, default_value = "preview.png")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output video path. Defaults to the suggested file name inside `--out-dir`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Directory for the suggested file name.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl JobArgs {
    fn options(&self) -> anyhow::Result<JobOptions> {
        let base = match &self.config {
            Some(path) => JobOptions::from_path(path)
                .with_context(|| format!("load job file '{}'", path.display()))?,
            None => JobOptions::default(),
        };
        let flags = JobOptions {
            phrase: self.phrase.clone(),
            highlights: self.highlight.clone().map(RawHighlights::Joined),
            color: self.color.clone(),
            duration: self.duration.clone().map(RawValue::Text),
            fps: self.fps.clone().map(RawValue::Text),
            resolution: self.resolution.clone(),
            grain: self.grain.clone().map(RawValue::Text),
            blur: self.blur.clone().map(RawValue::Text),
            mime_candidates: (!self.mime.is_empty()).then(|| self.mime.clone()),
            seed: self.seed,
        };
        Ok(base.merged_with(flags))
    }

    fn resolve(&self) -> anyhow::Result<ResolvedJob> {
        Ok(self.options()?.resolve(SurfaceConfig::default()))
    }

    fn sequencer(&self) -> anyhow::Result<FrameSequencer<Box<dyn Typesetter>>> {
        let typesetter = self.typesetter()?;
        let seq = FrameSequencer::new(typesetter);
        Ok(if self.no_pacing { seq.unpaced() } else { seq })
    }

    fn typesetter(&self) -> anyhow::Result<Box<dyn Typesetter>> {
        if !self.fonts.is_empty() {
            return Ok(Box::new(ParleyTypesetter::from_font_files(&self.fonts)?));
        }
        match ParleyTypesetter::discover() {
            Ok(t) => Ok(Box::new(t)),
            Err(e) => {
                tracing::warn!(error = %e, "no font available, drawing text as boxes");
                Ok(Box::new(BoxTypesetter))
            }
        }
    }
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn report(p: Progress) {
    eprint!("\r{}", p.label);
    if p.stage == Stage::Complete {
        eprintln!();
    }
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let job = args.job.resolve()?;
    let mut seq = args.job.sequencer()?;
    let mut rng = rng_for(job.seed);

    let last = seq.preview(job.surface.canvas(), &job.frame, &mut rng, report)?;

    ensure_parent_dir(&args.out)?;
    let straight = unpremultiply(&last.frame);
    image::save_buffer_with_format(
        &args.out,
        &straight,
        last.frame.width,
        last.frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let job = args.job.resolve()?;
    let mut seq = args.job.sequencer()?;
    let mut rng = rng_for(job.seed);
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());

    let outcome = seq.render(&job.video, &job.frame, &mut sink, &mut rng, report)?;

    let out = args
        .out
        .unwrap_or_else(|| args.out_dir.join(&outcome.artifact.suggested_filename));
    ensure_parent_dir(&out)?;
    std::fs::write(&out, &outcome.artifact.bytes)
        .with_context(|| format!("write video '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({} frames, {}, {:.2}s)",
        out.display(),
        outcome.stats.frames,
        outcome.stats.mime,
        outcome.stats.elapsed.as_secs_f64()
    );
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn unpremultiply(frame: &FrameRGBA) -> Vec<u8> {
    if !frame.premultiplied {
        return frame.data.clone();
    }
    let mut out = frame.data.clone();
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}
