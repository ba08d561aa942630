use anyhow::Result;
use clap::Parser;
use gtfsmerge::fixup::{self, shapes};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Round coordinate and distance columns to fixed precision"
)]
struct Args {
    /// Directory holding the extracted feed tables
    #[arg(long, default_value = "feed")]
    feed: PathBuf,
}

fn round_file(path: &Path, precision: &[(&str, usize)]) -> Result<()> {
    if !path.exists() {
        warn!(table = %path.display(), "not found, skipped");
        return Ok(());
    }
    let (header, rows) = fixup::read_table_file(path)?;
    let (rows, rounded) = shapes::round_columns(&header, rows, precision);
    fixup::write_table_file(path, &header, &rows)?;
    info!(table = %path.display(), rounded, "rounded");
    Ok(())
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    round_file(
        &args.feed.join("shapes.txt"),
        &[
            ("shape_pt_lat", 6),
            ("shape_pt_lon", 6),
            ("shape_dist_traveled", 2),
        ],
    )?;
    round_file(
        &args.feed.join("stop_times.txt"),
        &[("shape_dist_traveled", 2)],
    )
}
