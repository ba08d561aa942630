use anyhow::Result;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::feed::FeedArchive;
use crate::merge::config::{
    STOPS_TABLE, STOP_CODE_COLUMN, STOP_ID_COLUMN, STOP_NAME_COLUMN, TECHNICAL_STOP_NAME_MARKER,
    VIRTUAL_STOP_CODE_PREFIX, VIRTUAL_STOP_NAME_PREFIX,
};

/// Stop identifiers excluded feed-wide: border-crossing ("virtual")
/// stops and technical-only stops. Built once from every archive's
/// stops table before any table merge starts, then read-only.
pub struct StopDropSet {
    ids: HashSet<String>,
}

impl StopDropSet {
    pub fn build(archives: &[FeedArchive]) -> Result<Self> {
        let mut ids = HashSet::new();

        for archive in archives {
            let mut table = match archive.read_table(STOPS_TABLE) {
                Ok(Some(table)) => table,
                Ok(None) => {
                    debug!(archive = %archive.path().display(), "no stops table");
                    continue;
                }
                Err(err) => {
                    warn!(archive = %archive.path().display(), error = %err,
                        "unreadable stops table, skipping archive for drop-set");
                    continue;
                }
            };

            let find = |col: &str| table.header().iter().position(|h| h == col);
            let id_idx = match find(STOP_ID_COLUMN) {
                Some(idx) => idx,
                None => {
                    warn!(archive = %archive.path().display(),
                        "stops table lacks {} column, skipping", STOP_ID_COLUMN);
                    continue;
                }
            };
            let code_idx = find(STOP_CODE_COLUMN);
            let name_idx = find(STOP_NAME_COLUMN);

            for record in table.records() {
                let record = match record {
                    Ok(record) => record,
                    Err(err) => {
                        warn!(archive = %archive.path().display(), error = %err,
                            "stops record unreadable, stopping scan of this archive");
                        break;
                    }
                };
                let field = |idx: Option<usize>| {
                    idx.and_then(|i| record.get(i)).unwrap_or("").trim()
                };
                let code = field(code_idx);
                let name = field(name_idx).to_lowercase();

                let kind = if code.starts_with(VIRTUAL_STOP_CODE_PREFIX)
                    && name.starts_with(VIRTUAL_STOP_NAME_PREFIX)
                {
                    "virtual"
                } else if name.contains(TECHNICAL_STOP_NAME_MARKER) {
                    "technical"
                } else {
                    continue;
                };

                let id = field(Some(id_idx));
                if !id.is_empty() && ids.insert(id.to_string()) {
                    debug!(stop_id = id, kind, archive = %archive.path().display(),
                        "stop added to drop-set");
                }
            }
        }

        info!(count = ids.len(), "stop drop-set built");
        Ok(Self { ids })
    }

    /// Membership check; the candidate is trimmed the same way ids were
    /// when collected.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id.trim())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testutil::make_zip;

    fn build_from(entries: &[(&str, &str)]) -> StopDropSet {
        let tmp = make_zip(entries);
        let archive = FeedArchive::open(tmp.path()).unwrap();
        StopDropSet::build(&[archive]).unwrap()
    }

    #[test]
    fn virtual_stops_need_both_prefixes() {
        let set = build_from(&[(
            "stops.txt",
            "stop_id,stop_code,stop_name\n\
             S1,GR100,Granica West\n\
             S2,GR200,Centrum\n\
             S3,X100,granica east\n",
        )]);
        assert!(set.contains("S1"));
        assert!(!set.contains("S2"));
        assert!(!set.contains("S3"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn technical_marker_matches_case_insensitively() {
        let set = build_from(&[(
            "stops.txt",
            "stop_id,stop_code,stop_name\n\
             S1,100,Zajezdnia TECHNICZNY wyjazd\n\
             S2,200,Rynek\n",
        )]);
        assert!(set.contains("S1"));
        assert!(!set.contains("S2"));
    }

    #[test]
    fn ids_are_trimmed_and_empty_ids_ignored() {
        let set = build_from(&[(
            "stops.txt",
            "stop_id,stop_code,stop_name\n\
             \" S1 \",GR1,granica north\n\
             ,GR2,granica south\n",
        )]);
        assert!(set.contains("S1"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn union_across_archives_deduplicates() {
        let rows = "stop_id,stop_code,stop_name\nS1,GR1,granica west\n";
        let a = make_zip(&[("stops.txt", rows)]);
        let b = make_zip(&[("stops.txt", rows)]);
        let archives = vec![
            FeedArchive::open(a.path()).unwrap(),
            FeedArchive::open(b.path()).unwrap(),
        ];
        let set = StopDropSet::build(&archives).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn archives_without_stops_contribute_nothing() {
        let set = build_from(&[("routes.txt", "route_id\nR1\n")]);
        assert!(set.is_empty());
    }
}
