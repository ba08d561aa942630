//! Merge GTFS feed archives into one canonical zip.
//!
//! The `merge` module holds the multi-archive table-merge engine; `feed`
//! handles zip/CSV I/O; `fixup` carries the single-table repair passes
//! used by the auxiliary binaries.

pub mod feed;
pub mod fixup;
pub mod merge;
