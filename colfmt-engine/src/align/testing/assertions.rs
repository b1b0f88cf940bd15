//! Column assertions over rendered output

/// Character column at which `needle` first starts in `line`, if present.
pub fn column_of(line: &str, needle: &str) -> Option<usize> {
    let byte = line.find(needle)?;
    Some(line[..byte].chars().count())
}

/// Assert that `needle` starts at the same column on every line that contains it.
pub fn assert_same_column(lines: &[&str], needle: &str) {
    let columns: Vec<usize> = lines
        .iter()
        .filter_map(|line| column_of(line, needle))
        .collect();
    assert!(
        !columns.is_empty(),
        "no line contains '{}' in {:?}",
        needle,
        lines
    );
    let first = columns[0];
    assert!(
        columns.iter().all(|c| *c == first),
        "'{}' starts at columns {:?} in {:?}",
        needle,
        columns,
        lines
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_of_counts_chars() {
        assert_eq!(column_of("int  x", "x"), Some(5));
        assert_eq!(column_of("int  x", "y"), None);
    }

    #[test]
    fn test_assert_same_column_passes() {
        assert_same_column(&["int    x = 1;", "String y = 2;"], "= ");
    }

    #[test]
    #[should_panic(expected = "starts at columns")]
    fn test_assert_same_column_detects_mismatch() {
        assert_same_column(&["a = 1;", "bb = 2;"], "=");
    }
}
