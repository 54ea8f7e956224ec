//! Input line validation

/// Check that a CSV line is non-blank and has at least `expected_columns` fields.
pub fn is_valid_csv_line(line: &str, expected_columns: usize, delimiter: char) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    line.split(delimiter).count() >= expected_columns
}
