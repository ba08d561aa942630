//! Repair all-caps `route_long_name` values using `route_desc` as the
//! casing reference, then blank descriptions that merely repeat the
//! long name.

use tracing::debug;

use crate::fixup::column_index;

/// GTFS separator between route endpoints in a long name.
const ENDPOINT_SEPARATOR: &str = " - ";

/// Case-insensitive search for `fragment` inside `text`; returns the
/// matched span with `text`'s original casing.
fn find_fragment(fragment: &str, text: &str) -> Option<String> {
    let frag: Vec<char> = fragment.chars().collect();
    let chars: Vec<char> = text.chars().collect();
    if frag.is_empty() || frag.len() > chars.len() {
        return None;
    }
    for start in 0..=chars.len() - frag.len() {
        let window = &chars[start..start + frag.len()];
        if window
            .iter()
            .zip(&frag)
            .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
        {
            return Some(window.iter().collect());
        }
    }
    None
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when the value has at least one cased character and none of
/// them is lowercase.
fn is_all_caps(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// Rebuild an all-caps name endpoint by endpoint: each ` - `-separated
/// part is looked up in `reference` case-insensitively and replaced
/// with the reference casing, falling back to simple title case.
pub fn recase_from_reference(all_caps: &str, reference: &str) -> String {
    if reference.is_empty() {
        return title_case(all_caps);
    }
    all_caps
        .split(ENDPOINT_SEPARATOR)
        .map(|part| find_fragment(part, reference).unwrap_or_else(|| title_case(part)))
        .collect::<Vec<_>>()
        .join(ENDPOINT_SEPARATOR)
}

/// Apply the repair to routes rows. Returns rows plus how many names
/// were recased and how many descriptions were blanked.
pub fn fix_rows(
    header: &[String],
    mut rows: Vec<Vec<String>>,
) -> (Vec<Vec<String>>, usize, usize) {
    let (name_idx, desc_idx) = match (
        column_index(header, "route_long_name"),
        column_index(header, "route_desc"),
    ) {
        (Some(n), Some(d)) => (n, d),
        _ => {
            debug!("routes table lacks route_long_name/route_desc, nothing to fix");
            return (rows, 0, 0);
        }
    };

    let mut recased = 0usize;
    let mut blanked = 0usize;
    for row in &mut rows {
        let long_name = row[name_idx].trim().to_string();
        let desc = row[desc_idx].trim().to_string();

        if !long_name.is_empty() && is_all_caps(&long_name) && !desc.is_empty() {
            let fixed = recase_from_reference(&long_name, &desc);
            if fixed != long_name {
                row[name_idx] = fixed;
                recased += 1;
            }
        }

        let long_name = row[name_idx].trim().to_string();
        if !desc.is_empty()
            && !long_name.is_empty()
            && desc.to_lowercase() == long_name.to_lowercase()
        {
            row[desc_idx] = String::new();
            blanked += 1;
        }
    }
    (rows, recased, blanked)
}
