/// Ordered union of the given (already drop-filtered) headers: the first
/// archive to introduce a column fixes its position. Returns `None` when
/// no header contributes any column, in which case the table is skipped
/// by the caller.
pub fn reconcile(filtered_headers: &[Vec<String>]) -> Option<Vec<String>> {
    let mut reconciled: Vec<String> = Vec::new();
    for header in filtered_headers {
        for column in header {
            if !reconciled.contains(column) {
                reconciled.push(column.clone());
            }
        }
    }
    if reconciled.is_empty() {
        None
    } else {
        Some(reconciled)
    }
}
