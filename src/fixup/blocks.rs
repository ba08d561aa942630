//! Clear `block_id` on trips whose stop-time intervals overlap another
//! trip in the same block and service.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::fixup::column_index;

/// Seconds since midnight for a GTFS clock value. Hours may exceed 23
/// for trips running past midnight. Empty or malformed values count as
/// zero, mirroring how absent times are treated.
pub fn parse_gtfs_time(value: &str) -> u32 {
    let mut parts = value.trim().split(':');
    let (h, m, s) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(s)) => (h, m, s),
        _ => return 0,
    };
    match (h.parse::<u32>(), m.parse::<u32>(), s.parse::<u32>()) {
        (Ok(h), Ok(m), Ok(s)) => h * 3600 + m * 60 + s,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    start: u32,
    end: u32,
}

/// First/last arrival per trip, from stop_times rows in file order.
fn trip_intervals(
    stop_times_header: &[String],
    stop_times_rows: &[Vec<String>],
) -> HashMap<String, Interval> {
    let (trip_idx, arrival_idx) = match (
        column_index(stop_times_header, "trip_id"),
        column_index(stop_times_header, "arrival_time"),
    ) {
        (Some(t), Some(a)) => (t, a),
        _ => return HashMap::new(),
    };

    let mut intervals: HashMap<String, Interval> = HashMap::new();
    for row in stop_times_rows {
        let trip_id = row[trip_idx].clone();
        let arrival = parse_gtfs_time(&row[arrival_idx]);
        intervals
            .entry(trip_id)
            .and_modify(|i| i.end = arrival)
            .or_insert(Interval {
                start: arrival,
                end: arrival,
            });
    }
    intervals
}

/// Trip ids whose interval overlaps a sibling's within the same
/// (block_id, service_id) group.
pub fn overlapping_trips(
    trips_header: &[String],
    trips_rows: &[Vec<String>],
    stop_times_header: &[String],
    stop_times_rows: &[Vec<String>],
) -> HashSet<String> {
    let (trip_idx, block_idx, service_idx) = match (
        column_index(trips_header, "trip_id"),
        column_index(trips_header, "block_id"),
        column_index(trips_header, "service_id"),
    ) {
        (Some(t), Some(b), Some(s)) => (t, b, s),
        _ => {
            debug!("trips table lacks trip_id/block_id/service_id, nothing to check");
            return HashSet::new();
        }
    };

    let intervals = trip_intervals(stop_times_header, stop_times_rows);

    // (block, service) -> trips
    let mut groups: HashMap<(String, String), Vec<&str>> = HashMap::new();
    for row in trips_rows {
        let block_id = row[block_idx].trim();
        if block_id.is_empty() {
            continue;
        }
        groups
            .entry((block_id.to_string(), row[service_idx].clone()))
            .or_default()
            .push(&row[trip_idx]);
    }

    let mut to_clear = HashSet::new();
    for trips in groups.values() {
        let mut timed: Vec<(&str, Interval)> = trips
            .iter()
            .filter_map(|id| intervals.get(*id).map(|i| (*id, *i)))
            .collect();
        timed.sort_by_key(|(_, i)| i.start);

        for pair in timed.windows(2) {
            let (current_id, current) = pair[0];
            let (next_id, next) = pair[1];
            if current.end > next.start {
                to_clear.insert(current_id.to_string());
                to_clear.insert(next_id.to_string());
            }
        }
    }
    to_clear
}

/// Blank `block_id` on the listed trips; returns the cleared count.
pub fn clear_blocks(
    trips_header: &[String],
    rows: &mut [Vec<String>],
    to_clear: &HashSet<String>,
) -> usize {
    let (trip_idx, block_idx) = match (
        column_index(trips_header, "trip_id"),
        column_index(trips_header, "block_id"),
    ) {
        (Some(t), Some(b)) => (t, b),
        _ => return 0,
    };
    let mut cleared = 0usize;
    for row in rows.iter_mut() {
        if to_clear.contains(&row[trip_idx]) && !row[block_idx].is_empty() {
            row[block_idx] = String::new();
            cleared += 1;
        }
    }
    cleared
}
