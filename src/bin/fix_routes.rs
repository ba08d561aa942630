use anyhow::Result;
use clap::Parser;
use gtfsmerge::fixup::{self, routes};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Recase all-caps route long names using route_desc as reference"
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
    let path = args.feed.join("routes.txt");
    if !path.exists() {
        warn!(table = %path.display(), "not found, nothing to fix");
        return Ok(());
    }

    let (header, rows) = fixup::read_table_file(&path)?;
    let (rows, recased, blanked) = routes::fix_rows(&header, rows);
    fixup::write_table_file(&path, &header, &rows)?;
    info!(recased, blanked, "fixed routes.txt");
    Ok(())
}
