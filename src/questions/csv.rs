//! Quote-aware splitting of delimited question records

/// Field delimiter of the question source
pub const DELIMITER: char = ',';

/// Split one record into trimmed fields
///
/// A `"` toggles quoting; a delimiter inside quotes is kept as text. Each
/// field is trimmed and loses one surrounding pair of quotes.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == DELIMITER && !in_quotes {
            fields.push(finish_field(&current));
            current.clear();
        } else {
            current.push(ch);
        }
    }
    fields.push(finish_field(&current));

    fields
}

fn finish_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    trimmed.to_string()
}

/// Data rows of a source blob: header dropped, blank lines skipped
pub fn data_rows(raw: &str) -> impl Iterator<Item = (usize, &str)> {
    raw.trim()
        .lines()
        .enumerate()
        .skip(1)
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields() {
        assert_eq!(split_record("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_delimiter() {
        let fields = split_record(r#""Paulskirche, Frankfurt",B,"C""#);
        assert_eq!(fields, vec!["Paulskirche, Frankfurt", "B", "C"]);
    }

    #[test]
    fn test_empty_fields_kept() {
        assert_eq!(split_record("a,,c,"), vec!["a", "", "c", ""]);
    }

    #[test]
    fn test_data_rows_skip_header_and_blanks() {
        let raw = "Question,A\n\nfirst,1\r\n   \nsecond,2\n";
        let rows: Vec<_> = data_rows(raw).collect();
        assert_eq!(rows, vec![(3, "first,1"), (5, "second,2")]);
    }
}
