use anyhow::Result;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

use crate::feed::FeedArchive;
use crate::merge::config::{MergeConfig, STOP_ID_COLUMN};
use crate::merge::drop_set::StopDropSet;
use crate::merge::headers;

/// One fully merged table, ready for the writer.
pub struct MergedTable {
    pub name: String,
    pub header: Vec<String>,
    pub records: Vec<Vec<String>>,
    pub stats: MergeStats,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MergeStats {
    pub emitted: usize,
    pub exact_duplicates: usize,
    pub key_collisions: usize,
    pub dropped_stops: usize,
}

/// Merge `table` across `archives` in priority order: first archive to
/// carry an identity key wins, later conflicting records are discarded.
/// Returns `Ok(None)` when no archive contributes a usable header and
/// the table is skipped from output.
pub fn merge_table(
    table: &str,
    archives: &[FeedArchive],
    cfg: &MergeConfig,
    drop_set: &StopDropSet,
) -> Result<Option<MergedTable>> {
    // ── headers: collect each archive's drop-filtered header ─────────
    let mut filtered: Vec<(usize, Vec<String>)> = Vec::new();
    for (idx, archive) in archives.iter().enumerate() {
        if let Ok(Some(t)) = archive.read_table(table) {
            filtered.push((idx, cfg.filter_header(t.header())));
        }
    }

    let mut excluded: HashSet<usize> = HashSet::new();
    let reconciled = if cfg.strict_headers {
        let reference = filtered.iter().find(|(_, h)| !h.is_empty());
        match reference {
            None => None,
            Some((ref_idx, ref_header)) => {
                let ref_set: HashSet<&String> = ref_header.iter().collect();
                for (idx, header) in &filtered {
                    if idx == ref_idx {
                        continue;
                    }
                    let set: HashSet<&String> = header.iter().collect();
                    if set != ref_set {
                        error!(
                            table,
                            archive = %archives[*idx].path().display(),
                            "header mismatch, archive contribution skipped (strict mode)"
                        );
                        excluded.insert(*idx);
                    }
                }
                Some(ref_header.clone())
            }
        }
    } else {
        let headers: Vec<Vec<String>> = filtered.iter().map(|(_, h)| h.clone()).collect();
        headers::reconcile(&headers)
    };

    let reconciled = match reconciled {
        Some(header) => header,
        None => {
            warn!(table, "empty header across all archives, table skipped");
            return Ok(None);
        }
    };

    // ── keys & filters against the reconciled header ─────────────────
    let key_columns = cfg.identity_key(table, &reconciled);
    let key_idx: Vec<usize> = key_columns
        .iter()
        .filter_map(|k| reconciled.iter().position(|c| c == k))
        .collect();
    let stop_idx = reconciled.iter().position(|c| c == STOP_ID_COLUMN);

    // ── merge pass: archives strictly in priority order ──────────────
    let mut seen_keys: HashSet<Vec<String>> = HashSet::new();
    let mut seen_rows: HashSet<Vec<String>> = HashSet::new();
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut stats = MergeStats::default();

    for (idx, archive) in archives.iter().enumerate() {
        if excluded.contains(&idx) {
            continue;
        }
        let archive_path = archive.path().display().to_string();
        let mut t = match archive.read_table(table) {
            Ok(Some(t)) => t,
            Ok(None) => {
                info!(table, archive = %archive_path, "table missing in archive");
                continue;
            }
            Err(err) => {
                warn!(table, archive = %archive_path, error = %err,
                    "unreadable table entry, archive contribution skipped");
                continue;
            }
        };
        if t.header().is_empty() {
            debug!(table, archive = %archive_path, "empty header, nothing to contribute");
            continue;
        }

        let projection: Vec<Option<usize>> = reconciled
            .iter()
            .map(|col| t.header().iter().position(|h| h == col))
            .collect();

        for record in t.records() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    warn!(table, archive = %archive_path, error = %err,
                        "record parse error, rest of archive contribution skipped");
                    break;
                }
            };

            let row: Vec<String> = projection
                .iter()
                .map(|pos| pos.and_then(|i| record.get(i)).unwrap_or("").to_string())
                .collect();

            if let Some(si) = stop_idx {
                if drop_set.contains(&row[si]) {
                    info!(table, archive = %archive_path, stop_id = %row[si].trim(),
                        "record removed by stop drop-set");
                    stats.dropped_stops += 1;
                    continue;
                }
            }

            let key: Vec<String> = key_idx.iter().map(|&i| row[i].clone()).collect();
            if seen_keys.contains(&key) {
                if seen_rows.contains(&row) {
                    debug!(table, archive = %archive_path, key = ?key,
                        "exact duplicate record discarded");
                    stats.exact_duplicates += 1;
                } else {
                    info!(table, archive = %archive_path, key = ?key,
                        "conflicting record with duplicate identity discarded");
                    stats.key_collisions += 1;
                }
                continue;
            }

            seen_keys.insert(key);
            seen_rows.insert(row.clone());
            records.push(row);
        }
    }

    stats.emitted = records.len();
    info!(
        table,
        emitted = stats.emitted,
        exact_duplicates = stats.exact_duplicates,
        key_collisions = stats.key_collisions,
        dropped_stops = stats.dropped_stops,
        "table merged"
    );

    Ok(Some(MergedTable {
        name: table.to_string(),
        header: reconciled,
        records,
        stats,
    }))
}
