use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "badgetext", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one thumbnail.
    Thumb(ThumbArgs),
    /// Print the detected safe zone of a template as JSON.
    Zone(ZoneArgs),
    /// Render every job of a JSON manifest in parallel.
    Batch(BatchArgs),
}

#[derive(Parser, Debug)]
struct ThumbArgs {
    /// Template image.
    #[arg(long)]
    template: PathBuf,

    /// Course title.
    #[arg(long)]
    course: String,

    /// Unit title.
    #[arg(long)]
    unit_name: String,

    /// Unit label, e.g. "Unit 3". Selects the three-tier layout.
    #[arg(long)]
    unit_number: Option<String>,

    /// Output path; `.png` writes PNG, anything else JPEG.
    #[arg(long)]
    out: PathBuf,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra font directory, searched before the configured ones.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ZoneArgs {
    /// Template image.
    #[arg(long)]
    template: PathBuf,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// JSON array of jobs.
    #[arg(long)]
    manifest: PathBuf,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra font directory, searched before the configured ones.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Thumb(args) => cmd_thumb(args),
        Command::Zone(args) => cmd_zone(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn load_config(
    path: Option<&PathBuf>,
    fonts_dir: Option<PathBuf>,
) -> anyhow::Result<badgetext::Config> {
    let mut cfg = match path {
        Some(p) => badgetext::Config::from_path(p)?,
        None => badgetext::Config::default(),
    };
    if let Some(dir) = fonts_dir {
        cfg.fonts.dirs.insert(0, dir);
    }
    Ok(cfg)
}

fn cmd_thumb(args: ThumbArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_ref(), args.fonts_dir)?;
    let renderer = badgetext::ThumbnailRenderer::new(cfg)?;

    let mut text = badgetext::EpisodeText::new(args.course, args.unit_name);
    if let Some(n) = args.unit_number {
        text = text.with_unit_number(n);
    }

    let report = renderer.render_file(&args.template, &text, &args.out)?;
    if report.overflowed {
        eprintln!("warning: text did not fit at the minimum size");
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_zone(args: ZoneArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_ref(), None)?;
    cfg.layout.validate()?;
    let img = badgetext::load_template(&args.template)?;
    let analysis = badgetext::analyze_zone(&img, &cfg.layout.zone)?;
    let json = serde_json::to_string_pretty(&analysis).context("serialize zone")?;
    println!("{json}");
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_ref(), args.fonts_dir)?;
    let renderer = badgetext::ThumbnailRenderer::new(cfg)?;
    let jobs = badgetext::load_manifest(&args.manifest)?;

    let outcomes = renderer.render_batch(&jobs, args.threads)?;
    let mut failed = 0usize;
    for o in &outcomes {
        match &o.result {
            Ok(_) => eprintln!("wrote {}", o.output.display()),
            Err(e) => {
                failed += 1;
                eprintln!("failed {}: {e}", o.output.display());
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} jobs failed", outcomes.len());
    }
    Ok(())
}
