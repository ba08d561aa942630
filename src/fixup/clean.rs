//! Strip invisible/problematic characters from field values.

/// Characters removed outright from every field.
pub const INVISIBLE_CHARS: &[char] = &[
    '\u{00A0}', // non-breaking space
    '\u{200B}', // zero-width space
    '\u{200C}', // zero-width non-joiner
    '\u{200D}', // zero-width joiner
    '\u{FEFF}', // zero-width no-break space (BOM)
];

pub fn clean_value(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| !INVISIBLE_CHARS.contains(c))
        .collect();
    stripped.trim().to_string()
}

/// Clean every field of every row; returns the rows and how many fields
/// changed.
pub fn clean_rows(rows: Vec<Vec<String>>) -> (Vec<Vec<String>>, usize) {
    let mut changed = 0usize;
    let rows = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|value| {
                    let cleaned = clean_value(&value);
                    if cleaned != value {
                        changed += 1;
                    }
                    cleaned
                })
                .collect()
        })
        .collect();
    (rows, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_invisible_characters_entirely() {
        assert_eq!(clean_value("Plac\u{00A0}Wolno\u{015b}ci"), "PlacWolno\u{015b}ci");
        assert_eq!(clean_value("\u{200B}Rynek\u{FEFF}"), "Rynek");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(clean_value("  Dworzec  "), "Dworzec");
    }

    #[test]
    fn counts_changed_fields() {
        let rows = vec![
            vec!["ok".to_string(), " padded ".to_string()],
            vec!["Rynek\u{200B}".to_string()],
        ];
        let (rows, changed) = clean_rows(rows);
        assert_eq!(changed, 2);
        assert_eq!(rows[0], ["ok", "padded"]);
        assert_eq!(rows[1], ["Rynek"]);
    }
}
