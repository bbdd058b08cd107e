use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nagai-outline", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame of a project as a PNG.
    Frame(FrameArgs),
    /// Write the procedural noise texture as a PNG.
    Noise(NoiseArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based). Frames before it run first.
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct NoiseArgs {
    /// Texture edge length in pixels.
    #[arg(long, default_value_t = 256)]
    size: u32,

    /// Noise seed.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Noise(args) => cmd_noise(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = nagai_outline::OutlineProject::from_path(&args.in_path)?;
    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));

    let mut session = nagai_outline::OutlineSession::new(&project, assets_root)?;
    let frame = session.render_frame(nagai_outline::FrameIndex(args.frame))?;

    write_png(&args.out, &frame.data, frame.width, frame.height)
}

fn cmd_noise(args: NoiseArgs) -> anyhow::Result<()> {
    let tex = nagai_outline::Texture2D::procedural_noise(args.size, args.seed)?;
    write_png(&args.out, tex.data(), tex.width(), tex.height())
}

fn write_png(out: &Path, data: &[u8], width: u32, height: u32) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        out,
        data,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}
