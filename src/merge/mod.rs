pub mod config;
pub mod drop_set;
pub mod headers;
pub mod merger;

pub use config::MergeConfig;
pub use drop_set::StopDropSet;
pub use merger::{merge_table, MergeStats, MergedTable};

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::feed::{FeedArchive, FeedWriter};

/// Merge the given feed archives (in priority order) into one output
/// archive. The stop drop-set is finalized before any table merge
/// starts; independent tables then merge in parallel and are written
/// sorted by name so the output is deterministic.
pub fn merge_feeds(inputs: &[PathBuf], output: &Path, cfg: &MergeConfig) -> Result<()> {
    let mut archives = Vec::with_capacity(inputs.len());
    for path in inputs {
        let archive = FeedArchive::open(path)?;
        info!(archive = %path.display(), tables = archive.table_names().len(), "opened");
        archives.push(archive);
    }

    let drop_set = StopDropSet::build(&archives)?;

    let table_names: Vec<String> = archives
        .iter()
        .flat_map(|a| a.table_names().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let merged: Vec<Option<MergedTable>> = table_names
        .par_iter()
        .map(|table| merge_table(table, &archives, cfg, &drop_set))
        .collect::<Result<_>>()?;

    let mut writer = FeedWriter::create(output)?;
    let mut written = 0usize;
    for table in merged.into_iter().flatten() {
        writer.write_table(&table.name, &table.header, &table.records)?;
        written += 1;
    }
    writer
        .finish()
        .with_context(|| format!("writing {}", output.display()))?;

    info!(output = %output.display(), tables = written, "merge complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testutil::make_zip;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn merged_archive_is_sorted_and_deterministic() -> Result<()> {
        let a = make_zip(&[
            ("trips.txt", "trip_id,route_id\nT1,R1\n"),
            ("agency.txt", "agency_id,agency_name\nA1,Metro\n"),
        ]);
        let b = make_zip(&[("routes.txt", "route_id,route_long_name\nR1,Alpha\n")]);
        let inputs = vec![a.path().to_path_buf(), b.path().to_path_buf()];
        let cfg = MergeConfig::default();

        let out1 = NamedTempFile::new()?;
        let out2 = NamedTempFile::new()?;
        merge_feeds(&inputs, out1.path(), &cfg)?;
        merge_feeds(&inputs, out2.path(), &cfg)?;

        assert_eq!(fs::read(out1.path())?, fs::read(out2.path())?);

        let merged = FeedArchive::open(out1.path())?;
        assert_eq!(
            merged.table_names(),
            ["agency.txt", "routes.txt", "trips.txt"]
        );
        Ok(())
    }

    #[test]
    fn dependent_tables_lose_drop_set_stops_feed_wide() -> Result<()> {
        let a = make_zip(&[(
            "stops.txt",
            "stop_id,stop_code,stop_name\nS9,GR100,granica west\nS1,100,Rynek\n",
        )]);
        let b = make_zip(&[(
            "stop_times.txt",
            "trip_id,stop_sequence,stop_id\nT1,1,S9\nT1,2,S1\n",
        )]);
        let inputs = vec![a.path().to_path_buf(), b.path().to_path_buf()];
        let out = NamedTempFile::new()?;
        merge_feeds(&inputs, out.path(), &MergeConfig::default())?;

        let merged = FeedArchive::open(out.path())?;
        let mut stops = merged.read_table("stops.txt")?.unwrap();
        let stop_rows: Vec<_> = stops.records().collect::<csv::Result<_>>()?;
        assert_eq!(stop_rows.len(), 1);
        assert_eq!(&stop_rows[0][0], "S1");

        let mut stop_times = merged.read_table("stop_times.txt")?.unwrap();
        let st_rows: Vec<_> = stop_times.records().collect::<csv::Result<_>>()?;
        assert_eq!(st_rows.len(), 1);
        assert_eq!(&st_rows[0][2], "S1");
        Ok(())
    }

    #[test]
    fn swapping_archive_order_swaps_precedence_not_keys() -> Result<()> {
        let a = make_zip(&[("routes.txt", "route_id,route_long_name\nR1,Alpha\n")]);
        let b = make_zip(&[("routes.txt", "route_id,route_long_name\nR1,Beta\n")]);
        let cfg = MergeConfig::default();

        let out_ab = NamedTempFile::new()?;
        merge_feeds(
            &[a.path().to_path_buf(), b.path().to_path_buf()],
            out_ab.path(),
            &cfg,
        )?;
        let out_ba = NamedTempFile::new()?;
        merge_feeds(
            &[b.path().to_path_buf(), a.path().to_path_buf()],
            out_ba.path(),
            &cfg,
        )?;

        let read_long_name = |path: &Path| -> Result<String> {
            let merged = FeedArchive::open(path)?;
            let mut routes = merged.read_table("routes.txt")?.unwrap();
            let rows: Vec<_> = routes.records().collect::<csv::Result<Vec<_>>>()?;
            assert_eq!(rows.len(), 1);
            Ok(rows[0][1].to_string())
        };
        assert_eq!(read_long_name(out_ab.path())?, "Alpha");
        assert_eq!(read_long_name(out_ba.path())?, "Beta");
        Ok(())
    }
}
