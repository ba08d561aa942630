use anyhow::{Context, Result};
use clap::Parser;
use gtfsmerge::fixup::{self, clean};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Strip invisible characters from every table in a feed directory"
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

    let mut tables: Vec<PathBuf> = std::fs::read_dir(&args.feed)
        .with_context(|| format!("reading feed directory {}", args.feed.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("txt"))
        .collect();
    tables.sort();

    for path in tables {
        let (header, rows) = fixup::read_table_file(&path)?;
        let (rows, changed) = clean::clean_rows(rows);
        fixup::write_table_file(&path, &header, &rows)?;
        info!(table = %path.display(), changed, "cleaned");
    }
    Ok(())
}
