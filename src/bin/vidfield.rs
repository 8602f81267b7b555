use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};
use vidfield::FrameSource as _;

#[derive(Parser, Debug)]
#[command(name = "vidfield", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Map one still image onto the field and render a PNG preview.
    Frame(FrameArgs),
    /// Play a directory of stills as consecutive frames, one PNG per tick.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct FieldArgs {
    /// Mapper config JSON; missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid density along the short axis.
    #[arg(long, default_value_t = 40)]
    grid: u32,

    /// Override the policy from the config.
    #[arg(long, value_enum)]
    policy: Option<PolicyChoice>,

    /// Which aspect ratio shapes the grid.
    #[arg(long, value_enum, default_value_t = AspectChoice::Viewport)]
    aspect: AspectChoice,

    /// Preview width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Preview height in pixels.
    #[arg(long, default_value_t = 480)]
    height: u32,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image (png, jpeg, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the particle attributes as JSON.
    #[arg(long)]
    dump: Option<PathBuf>,

    #[command(flatten)]
    field: FieldArgs,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Directory of input images, played in file-name order.
    #[arg(long)]
    frames: PathBuf,

    /// Directory receiving `frame_00000.png`, `frame_00001.png`, ...
    #[arg(long)]
    out_dir: PathBuf,

    #[command(flatten)]
    field: FieldArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyChoice {
    Rotation,
    Size,
    Similarity,
    Drift,
}

impl From<PolicyChoice> for vidfield::MappingPolicy {
    fn from(c: PolicyChoice) -> Self {
        match c {
            PolicyChoice::Rotation => Self::RotationFromBrightness,
            PolicyChoice::Size => Self::SizeFromBrightness,
            PolicyChoice::Similarity => Self::SizeFromColorSimilarity,
            PolicyChoice::Drift => Self::Drift,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AspectChoice {
    Viewport,
    Source,
}

impl From<AspectChoice> for vidfield::AspectMode {
    fn from(c: AspectChoice) -> Self {
        match c {
            AspectChoice::Viewport => Self::Viewport,
            AspectChoice::Source => Self::Source,
        }
    }
}

#[derive(serde::Serialize)]
struct AttributeDump<'a> {
    policy: vidfield::MappingPolicy,
    grid: vidfield::GridSpec,
    attributes: vidfield::FieldAttributes<'a>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn read_config(args: &FieldArgs) -> anyhow::Result<vidfield::MapperConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            vidfield::MapperConfig::from_json_str(&s)
                .with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => vidfield::MapperConfig::default(),
    };
    if let Some(policy) = args.policy {
        config = config.with_policy(policy.into());
    }
    Ok(config)
}

fn preview_settings(args: &FieldArgs) -> vidfield::PreviewSettings {
    vidfield::PreviewSettings {
        width: args.width,
        height: args.height,
        clear_rgba: [18, 20, 28, 255],
    }
}

fn open_session(args: &FieldArgs, source_aspect: f64) -> anyhow::Result<vidfield::FieldSession> {
    let mode: vidfield::AspectMode = args.aspect.into();
    let initial_aspect = match mode {
        vidfield::AspectMode::Viewport => f64::from(args.width) / f64::from(args.height),
        vidfield::AspectMode::Source => source_aspect,
    };
    let session =
        vidfield::FieldSession::new(read_config(args)?, args.grid, mode, initial_aspect)?;
    tracing::info!(
        policy = session.config().policy.name(),
        width = session.grid().grid_width,
        height = session.grid().grid_height,
        particles = session.grid().particle_count,
        "field ready"
    );
    Ok(session)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let frame = vidfield::load_frame(&args.in_path)?;
    let viewport = viewport_for(&args.field, &frame);
    let mut session = open_session(&args.field, frame.aspect_ratio())?;

    let mut queue = vidfield::FrameQueue::new();
    queue.push(frame);
    session.tick(&mut queue, &viewport)?;

    let image = vidfield::render_preview(session.field(), &preview_settings(&args.field))?;
    write_png(&args.out, &image)?;
    eprintln!("wrote {}", args.out.display());

    if let Some(dump) = &args.dump {
        write_dump(dump, &session)?;
        eprintln!("wrote {}", dump.display());
    }
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut frames = vidfield::ImageSequence::from_dir(&args.frames)?;
    let settings = preview_settings(&args.field);
    let mut session: Option<vidfield::FieldSession> = None;
    let mut queue = vidfield::FrameQueue::new();
    let mut written = 0usize;

    while !frames.is_exhausted() {
        let Some(frame) = frames.next_frame() else {
            continue;
        };
        let viewport = viewport_for(&args.field, &frame);
        if session.is_none() {
            session = Some(open_session(&args.field, frame.aspect_ratio())?);
        }
        let Some(session) = session.as_mut() else {
            continue;
        };

        queue.push(frame);
        if let vidfield::TickOutcome::Applied(dirty) = session.tick(&mut queue, &viewport)? {
            tracing::debug!(index = written, ?dirty, "tick applied");
        }

        let image = vidfield::render_preview(session.field(), &settings)?;
        let out = args.out_dir.join(format!("frame_{written:05}.png"));
        write_png(&out, &image)?;
        written += 1;
    }

    if written == 0 {
        anyhow::bail!("no decodable frames in '{}'", args.frames.display());
    }
    eprintln!("wrote {written} frames to {}", args.out_dir.display());
    Ok(())
}

fn viewport_for(args: &FieldArgs, frame: &vidfield::Frame) -> vidfield::FixedViewport {
    vidfield::FixedViewport::new(
        f64::from(args.width) / f64::from(args.height),
        frame.aspect_ratio(),
    )
}

fn write_png(path: &Path, image: &vidfield::PreviewImage) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &image.data,
        image.width,
        image.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn write_dump(path: &Path, session: &vidfield::FieldSession) -> anyhow::Result<()> {
    let dump = AttributeDump {
        policy: session.config().policy,
        grid: *session.grid(),
        attributes: session.current_attributes(),
    };
    let f = File::create(path).with_context(|| format!("create dump '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), &dump)
        .with_context(|| format!("write dump '{}'", path.display()))
}
