use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelsynth::{
    AudioCatalog, ConfigOverrides, ContentPair, CpuRasterizer, FfmpegAudioDecoder, FfmpegWebmOpts,
    FfmpegWebmPlatform, Fps, PlanOverrides, RenderConfig, RenderPlan, RenderProgress, RenderRequest,
    StageRenderer, Timeline,
};

#[derive(Parser, Debug)]
#[command(name = "reelsynth", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the render plan (typing rhythm, answer lines, durations, audio) as JSON.
    Plan(PlanArgs),
    /// Render a single moment of the video as a PNG.
    Frame(FrameArgs),
    /// Render the full WebM video (requires `ffmpeg` with libvpx-vp9 and libopus).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct ContentArgs {
    /// Question shown by the typewriter.
    #[arg(long)]
    question: String,

    /// Answer revealed line by line.
    #[arg(long)]
    answer: String,

    /// Render configuration JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Audio catalog JSON. Without one the video has no audio track.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Force this catalog track id instead of the seeded choice.
    #[arg(long)]
    track: Option<String>,

    /// Override the background track volume.
    #[arg(long)]
    volume: Option<f64>,

    /// Override where the background track starts, in seconds.
    #[arg(long)]
    start: Option<f64>,

    /// Override the config's font file.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Override the config's ffmpeg binary.
    #[arg(long)]
    ffmpeg: Option<String>,

    /// Override the config's ffprobe binary.
    #[arg(long)]
    ffprobe: Option<String>,

    /// Override the config's frame rate, e.g. `30` or `30000/1001`.
    #[arg(long)]
    fps: Option<Fps>,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    content: ContentArgs,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    content: ContentArgs,

    /// Timeline time in seconds (clamped to the video).
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    content: ContentArgs,

    /// Output WebM path.
    #[arg(long)]
    out: PathBuf,
}

struct Loaded {
    cfg: RenderConfig,
    catalog: AudioCatalog,
    catalog_dir: Option<PathBuf>,
    pair: ContentPair,
    overrides: PlanOverrides,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelsynth=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load(args: &ContentArgs) -> anyhow::Result<Loaded> {
    let cfg = RenderConfig::load(
        args.config.as_deref(),
        &ConfigOverrides {
            font_path: args.font.clone(),
            ffmpeg_bin: args.ffmpeg.clone(),
            ffprobe_bin: args.ffprobe.clone(),
            fps: args.fps,
        },
    )?;
    let catalog = match &args.catalog {
        Some(path) => AudioCatalog::from_path(path)?,
        None => AudioCatalog::default(),
    };
    let catalog_dir = args
        .catalog
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);

    let audio_track = match &args.track {
        Some(id) => Some(
            catalog
                .tracks
                .iter()
                .find(|t| &t.id == id)
                .cloned()
                .with_context(|| format!("track '{id}' is not in the catalog"))?,
        ),
        None => None,
    };
    let overrides = PlanOverrides {
        audio_track,
        audio_volume: args.volume,
        audio_start_secs: args.start,
        ..PlanOverrides::default()
    };

    Ok(Loaded {
        cfg,
        catalog,
        catalog_dir,
        pair: ContentPair::new(args.question.as_str(), args.answer.as_str()),
        overrides,
    })
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let l = load(&args.content)?;
    let plan = RenderPlan::build(&l.pair, &l.catalog, &l.overrides, &l.cfg)?;
    let json = serde_json::to_string_pretty(&plan).context("serialize render plan")?;
    println!("{json}");
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let l = load(&args.content)?;
    let plan = RenderPlan::build(&l.pair, &l.catalog, &l.overrides, &l.cfg)?;
    let mut stage = plan.stage(&l.cfg);
    let timeline = Timeline::build(
        &stage,
        &plan.reveal_schedule()?,
        &plan.durations,
        plan.answer_lines.len(),
    )?;
    timeline.seek(&mut stage, args.time);

    let mut rasterizer = CpuRasterizer::new(reelsynth::load_font(l.cfg.font_path.as_deref())?)?;
    let frame = rasterizer.render_stage(&stage)?;
    let pixels = frame.flattened(l.cfg.bg_rgba)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &pixels,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let l = load(&args.content)?;
    let plan = RenderPlan::build(&l.pair, &l.catalog, &l.overrides, &l.cfg)?;
    let mut stage = plan.stage(&l.cfg);

    let rasterizer = CpuRasterizer::new(reelsynth::load_font(l.cfg.font_path.as_deref())?)?;
    let mut platform = FfmpegWebmPlatform::new(
        FfmpegWebmOpts {
            ffmpeg_bin: l.cfg.ffmpeg_bin.clone(),
            bg_rgba: l.cfg.bg_rgba,
            crf: l.cfg.crf,
        },
        Box::new(rasterizer),
    );
    let mut decoder = FfmpegAudioDecoder::new(l.cfg.ffmpeg_bin.as_str(), l.cfg.ffprobe_bin.as_str());
    if let Some(dir) = &l.catalog_dir {
        decoder = decoder.with_base_dir(dir);
    }

    let mut last_decile = None;
    let mut on_progress = |p: RenderProgress| {
        let decile = (p.progress * 10.0).floor() as u64;
        if last_decile != Some(decile) {
            last_decile = Some(decile);
            tracing::info!(frame = p.frame, total = p.total_frames, "{}%", decile * 10);
        }
    };

    let mut request = RenderRequest::new(l.pair.question.as_str(), l.pair.answer.as_str())
        .with_catalog(&l.catalog)
        .with_progress(&mut on_progress);
    request.audio_track = l.overrides.audio_track.clone();
    request.audio_volume = l.overrides.audio_volume;
    request.audio_start_secs = l.overrides.audio_start_secs;

    let out = reelsynth::render(&mut stage, request, &mut platform, &decoder, &l.cfg)?;
    out.blob.write_to(&args.out)?;

    eprintln!(
        "wrote {} ({} frames, {:.2}s, {} bytes)",
        args.out.display(),
        out.stats.total_frames,
        out.stats.duration_secs,
        out.stats.bytes
    );
    Ok(())
}
