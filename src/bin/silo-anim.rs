use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

use silo_anim::{RunConfig, RunOverrides, SequenceDriver};

#[derive(Parser, Debug)]
#[command(
    name = "silo-anim",
    version,
    about = "Render a granular-silo simulation trace into PNG frames and an MP4 video"
)]
struct Cli {
    /// JSON run configuration; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    run: RunOverrides,

    /// Log debug details.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Log warnings and errors only.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let base = match &cli.config {
        Some(path) => RunConfig::from_json_path(path)?,
        None => RunConfig::default(),
    };
    let run = base.with_overrides(&cli.run);
    let input = run
        .input
        .clone()
        .context("no input trace given (use -i/--input or \"input\" in --config)")?;

    let driver = SequenceDriver::new(run.render_config()?, run.driver_opts()?)?;
    let stats = driver
        .run_file(&input)
        .with_context(|| format!("render '{}'", input.display()))?;

    tracing::info!(
        frames_parsed = stats.frames_parsed,
        frames_written = stats.frames_written,
        lines_skipped = stats.lines_skipped,
        video = stats.video_written,
        "done"
    );
    if stats.video_written {
        eprintln!("wrote {}", driver.video_path().display());
    } else {
        eprintln!(
            "wrote {} frames to {}",
            stats.frames_written,
            driver.opts().out_dir.display()
        );
    }
    Ok(())
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else if quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}
