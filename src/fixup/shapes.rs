//! Reformat coordinate and distance columns to a fixed decimal
//! precision.

use crate::fixup::column_index;

/// Rewrite each listed `(column, decimals)` to fixed precision.
/// Unparsable or empty values pass through untouched. Returns rows plus
/// the count of reformatted fields.
pub fn round_columns(
    header: &[String],
    mut rows: Vec<Vec<String>>,
    precision: &[(&str, usize)],
) -> (Vec<Vec<String>>, usize) {
    let targets: Vec<(usize, usize)> = precision
        .iter()
        .filter_map(|(col, decimals)| column_index(header, col).map(|idx| (idx, *decimals)))
        .collect();

    let mut rounded = 0usize;
    for row in &mut rows {
        for &(idx, decimals) in &targets {
            let value = row[idx].trim();
            if value.is_empty() {
                continue;
            }
            if let Ok(number) = value.parse::<f64>() {
                let formatted = format!("{:.*}", decimals, number);
                if formatted != row[idx] {
                    row[idx] = formatted;
                    rounded += 1;
                }
            }
        }
    }
    (rows, rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn rounds_to_the_configured_precision() {
        let header = header(&["shape_pt_lat", "shape_pt_lon", "shape_dist_traveled"]);
        let rows = vec![vec![
            "50.2598765432".to_string(),
            "19.02".to_string(),
            "1234.5678".to_string(),
        ]];
        let (rows, rounded) = round_columns(
            &header,
            rows,
            &[
                ("shape_pt_lat", 6),
                ("shape_pt_lon", 6),
                ("shape_dist_traveled", 2),
            ],
        );
        assert_eq!(rows[0], ["50.259877", "19.020000", "1234.57"]);
        assert_eq!(rounded, 3);
    }

    #[test]
    fn empty_and_unparsable_values_pass_through() {
        let header = header(&["shape_dist_traveled"]);
        let rows = vec![vec!["".to_string()], vec!["n/a".to_string()]];
        let (rows, rounded) = round_columns(&header, rows, &[("shape_dist_traveled", 2)]);
        assert_eq!(rows[0][0], "");
        assert_eq!(rows[1][0], "n/a");
        assert_eq!(rounded, 0);
    }

    #[test]
    fn absent_columns_are_skipped() {
        let header = header(&["stop_id"]);
        let rows = vec![vec!["S1".to_string()]];
        let (rows, rounded) = round_columns(&header, rows, &[("shape_dist_traveled", 2)]);
        assert_eq!(rows[0][0], "S1");
        assert_eq!(rounded, 0);
    }
}
