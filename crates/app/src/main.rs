use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use xtalk_app::run_job;
use xtalk_foundation::EngineConfig;

#[derive(Parser)]
#[command(name = "xtalk")]
#[command(version)]
#[command(about = "Multi-channel crosstalk removal and voice activity detection")]
#[command(
    long_about = "Reads synchronized mono 16 kHz WAV files (one per microphone), decides per \
frame which channel carries the live speaker, suppresses crosstalk in the others, and writes \
cleaned per-channel audio plus per-channel diarization (.seg) files."
)]
struct Cli {
    /// Input WAV files, one mono channel each, in channel order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory; vad/ and diarization/ are created inside
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,

    /// Optional TOML file overriding engine defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the jitter source, for reproducible runs
    #[arg(long, env = "XTALK_SEED")]
    seed: Option<u64>,
}

fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_level).init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let cfg = EngineConfig::load(cli.config.as_deref()).context("loading engine configuration")?;
    tracing::info!(
        channels = cli.inputs.len(),
        chunk_frames = cfg.chunk_frames,
        "starting crosstalk removal"
    );

    let output = run_job(&cfg, &cli.inputs, &cli.out_dir, cli.seed)
        .context("crosstalk removal job failed")?;

    for (i, entries) in output.entries.iter().enumerate() {
        tracing::info!(channel = i + 1, segments = entries.len(), "channel summary");
    }
    Ok(())
}
