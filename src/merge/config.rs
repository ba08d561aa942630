use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};
use tracing::{info, warn};

/// Table holding the stop drop-set predicates.
pub const STOPS_TABLE: &str = "stops.txt";
/// Identifier column the drop-set filter keys on, in any table.
pub const STOP_ID_COLUMN: &str = "stop_id";
pub const STOP_CODE_COLUMN: &str = "stop_code";
pub const STOP_NAME_COLUMN: &str = "stop_name";

/// A stop is *virtual* when its code starts with this prefix and its
/// name starts with [`VIRTUAL_STOP_NAME_PREFIX`] (case-insensitive).
pub const VIRTUAL_STOP_CODE_PREFIX: &str = "GR";
pub const VIRTUAL_STOP_NAME_PREFIX: &str = "granica";
/// A stop is *technical* when its name contains this marker
/// (case-insensitive).
pub const TECHNICAL_STOP_NAME_MARKER: &str = "techniczny";

/// Identity-key columns per table. Key order here is irrelevant: the
/// resolver always applies keys in sorted order.
const DEFAULT_TABLE_KEYS: &[(&str, &[&str])] = &[
    ("agency.txt", &["agency_id"]),
    ("calendar.txt", &["service_id", "start_date", "end_date"]),
    ("calendar_dates.txt", &["service_id", "date"]),
    ("fare_attributes.txt", &["fare_id"]),
    ("fare_rules.txt", &["fare_id"]),
    ("feed_info.txt", &["feed_publisher_name"]),
    ("frequencies.txt", &["trip_id", "start_time"]),
    ("routes.txt", &["route_id"]),
    ("shapes.txt", &["shape_id", "shape_pt_sequence"]),
    ("stop_times.txt", &["trip_id", "stop_sequence"]),
    ("stops.txt", &["stop_id"]),
    ("trips.txt", &["trip_id"]),
];

/// Columns stripped from every header and record before merging.
const DEFAULT_DROP_COLUMNS: &[&str] = &["timepoint", "shape_dist_traveled"];

/// Merge policy: identity keys, drop columns, header strictness.
/// Compiled-in defaults cover a standard GTFS feed; a YAML file can
/// override any field.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub table_keys: BTreeMap<String, Vec<String>>,
    pub drop_columns: Vec<String>,
    /// When set, archives whose filtered header differs (as a set) from
    /// the reference archive's are skipped per table instead of being
    /// reconciled by union.
    pub strict_headers: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        let table_keys = DEFAULT_TABLE_KEYS
            .iter()
            .map(|(table, keys)| {
                (
                    table.to_string(),
                    keys.iter().map(|k| k.to_string()).collect(),
                )
            })
            .collect();
        Self {
            table_keys,
            drop_columns: DEFAULT_DROP_COLUMNS.iter().map(|c| c.to_string()).collect(),
            strict_headers: false,
        }
    }
}

impl MergeConfig {
    /// Defaults, or the YAML override at `path` if given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                let cfg: Self = serde_yaml::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?;
                info!(config = %path.display(), "loaded merge config override");
                Ok(cfg)
            }
        }
    }

    pub fn is_drop_column(&self, column: &str) -> bool {
        self.drop_columns.iter().any(|c| c == column)
    }

    /// Header with drop columns removed, order otherwise untouched.
    pub fn filter_header(&self, header: &[String]) -> Vec<String> {
        header
            .iter()
            .filter(|c| !self.is_drop_column(c))
            .cloned()
            .collect()
    }

    /// Resolve the dedup key for `table` against its reconciled header.
    /// Falls back to the first header column when the table is
    /// unconfigured or a configured key column is absent. Never fails
    /// for a non-empty header.
    pub fn identity_key(&self, table: &str, header: &[String]) -> Vec<String> {
        match self.table_keys.get(table) {
            None => {
                warn!(table, "no identity key configured, using first column");
                vec![header[0].clone()]
            }
            Some(keys) => {
                let mut sorted: Vec<String> = keys.clone();
                sorted.sort();
                let missing: Vec<&String> =
                    sorted.iter().filter(|k| !header.contains(*k)).collect();
                if missing.is_empty() {
                    sorted
                } else {
                    warn!(
                        table,
                        missing = ?missing,
                        "identity key columns absent from reconciled header, using first column"
                    );
                    vec![header[0].clone()]
                }
            }
        }
    }
}
