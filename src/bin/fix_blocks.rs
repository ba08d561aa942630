use anyhow::Result;
use clap::Parser;
use gtfsmerge::fixup::{self, blocks};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Clear block_id on trips with overlapping stop times in the same block"
)]
struct Args {
    /// Directory holding the extracted feed tables
    #[arg(long, default_value = "feed")]
    feed: PathBuf,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let trips_path = args.feed.join("trips.txt");
    let stop_times_path = args.feed.join("stop_times.txt");
    if !trips_path.exists() || !stop_times_path.exists() {
        warn!(feed = %args.feed.display(), "trips.txt or stop_times.txt missing, nothing to fix");
        return Ok(());
    }

    let (trips_header, mut trips_rows) = fixup::read_table_file(&trips_path)?;
    let (st_header, st_rows) = fixup::read_table_file(&stop_times_path)?;

    let flagged = blocks::overlapping_trips(&trips_header, &trips_rows, &st_header, &st_rows);
    let cleared = blocks::clear_blocks(&trips_header, &mut trips_rows, &flagged);
    fixup::write_table_file(&trips_path, &trips_header, &trips_rows)?;
    info!(cleared, "cleared overlapping block assignments");
    Ok(())
}
