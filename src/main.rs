use anyhow::{bail, Context, Result};
use clap::Parser;
use glob::glob;
use gtfsmerge::merge::{self, MergeConfig};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge GTFS feed archives into one canonical zip"
)]
struct Args {
    /// Input feed archives: paths or glob patterns, in priority order
    /// (first listed wins on conflicting records)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output archive path
    #[arg(short, long)]
    output: PathBuf,

    /// YAML override for identity keys / drop columns / header policy
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();

    // ─── resolve input archives ──────────────────────────────────────
    let mut paths: Vec<PathBuf> = Vec::new();
    for pattern in &args.inputs {
        let matches =
            glob(pattern).with_context(|| format!("invalid input pattern {}", pattern))?;
        for entry in matches {
            match entry {
                Ok(path) => paths.push(path),
                Err(err) => warn!(pattern = %pattern, error = %err, "unreadable glob match, skipped"),
            }
        }
    }
    if paths.is_empty() {
        bail!("no input archives matched {:?}", args.inputs);
    }
    info!(count = paths.len(), "resolved input archives");

    // ─── merge ───────────────────────────────────────────────────────
    let cfg = MergeConfig::load(args.config.as_deref())?;
    merge::merge_feeds(&paths, &args.output, &cfg)
}
