use std::{
    fs::File,
    io::{BufRead as _, BufReader},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use skyframe::{PixelBuffer, Renderer, RendererOpts, Reply};

#[derive(Parser, Debug)]
#[command(name = "skyframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Largest surface the renderer may allocate, in bytes.
    #[arg(long, global = true, default_value_t = 1 << 30)]
    max_surface_bytes: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one command to a PNG.
    Frame(FrameArgs),
    /// Replay a JSON-lines command stream, writing every rendered frame.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input command JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Input file with one command JSON object per line.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving `frame_<nnnn>.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("skyframe=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let opts = RendererOpts::default().with_max_surface_bytes(cli.max_surface_bytes);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args, opts),
        Command::Replay(args) => cmd_replay(args, opts),
    }
}

fn cmd_frame(args: FrameArgs, opts: RendererOpts) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read command '{}'", args.in_path.display()))?;

    let mut renderer = Renderer::spawn(opts)?;
    renderer.post_text(text)?;
    renderer.shutdown()?;

    let Some(reply) = renderer.replies().try_iter().next() else {
        anyhow::bail!("command produced no frame (animate commands are never replied to)");
    };
    match reply {
        Reply::Render(r) => {
            let draw_time_ms = r.draw_time_ms();
            write_png(&args.out, &r.into_pixels())?;
            eprintln!("wrote {} ({draw_time_ms:.2} ms)", args.out.display());
            Ok(())
        }
        Reply::Error(e) => anyhow::bail!("{}", e.error),
    }
}

fn cmd_replay(args: ReplayArgs, opts: RendererOpts) -> anyhow::Result<()> {
    let f = File::open(&args.in_path)
        .with_context(|| format!("open command stream '{}'", args.in_path.display()))?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut renderer = Renderer::spawn(opts)?;
    let mut frames = 0usize;
    for (i, line) in BufReader::new(f).lines().enumerate() {
        let line = line.with_context(|| format!("read line {}", i + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        renderer.post_text(line)?;
        while let Some(reply) = renderer.try_recv()? {
            write_replay_frame(&args.out_dir, &mut frames, reply)?;
        }
    }

    renderer.close();
    for reply in renderer.replies().iter() {
        write_replay_frame(&args.out_dir, &mut frames, reply)?;
    }
    let report = renderer.shutdown()?;

    eprintln!("wrote {frames} frame(s) to {}", args.out_dir.display());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn write_replay_frame(out_dir: &Path, frames: &mut usize, reply: Reply) -> anyhow::Result<()> {
    match reply {
        Reply::Render(r) => {
            let path = out_dir.join(format!("frame_{:04}.png", *frames));
            write_png(&path, &r.into_pixels())?;
            *frames += 1;
        }
        Reply::Error(e) => eprintln!("error: {}", e.error),
    }
    Ok(())
}

fn write_png(path: &Path, frame: &PixelBuffer) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
