//! CSV parsing
//!
//! Handles quoted fields, embedded commas and newlines, `""` escapes and any
//! mix of `\n`, `\r\n` and `\r` line endings. Blank lines are skipped.

use crate::models::RawRow;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvError {
    /// A quoted field was still open at end of input
    #[error("Unterminated quoted field starting on line {0}")]
    UnterminatedQuote(usize),
}

/// Split CSV text into records of raw fields
pub fn parse_records(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote(quote_line));
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    if record.iter().any(|f| !f.trim().is_empty()) {
        records.push(record);
    }
}

/// Zip data records against the header record
///
/// Header labels are trimmed; columns with an empty label are dropped.
/// Missing trailing fields become empty strings, surplus fields are ignored.
pub fn records_to_rows(records: Vec<Vec<String>>, origin: &str) -> Vec<RawRow> {
    let mut iter = records.into_iter();
    let headers: Vec<String> = match iter.next() {
        Some(header) => header.into_iter().map(|h| h.trim().to_string()).collect(),
        None => return Vec::new(),
    };

    iter.enumerate()
        .map(|(i, record)| {
            let mut row = RawRow::new(origin, i + 1);
            for (idx, label) in headers.iter().enumerate() {
                if label.is_empty() {
                    continue;
                }
                let value = record.get(idx).cloned().unwrap_or_default();
                row.push(label.clone(), value);
            }
            row
        })
        .collect()
}

/// Parse CSV text straight into rows
pub fn parse_csv(text: &str, origin: &str) -> Result<Vec<RawRow>, CsvError> {
    Ok(records_to_rows(parse_records(text)?, origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_fields_with_commas_and_escapes() {
        let records =
            parse_records("a,b,c\n\"x, y\",\"say \"\"hi\"\"\",plain\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], vec!["x, y", "say \"hi\"", "plain"]);
    }

    #[test]
    fn test_mixed_line_endings_and_blank_lines() {
        let records = parse_records("h1,h2\r\n1,2\n\n3,4\r\r\n5,6").unwrap();
        assert_eq!(
            records,
            vec![
                vec!["h1", "h2"],
                vec!["1", "2"],
                vec!["3", "4"],
                vec!["5", "6"],
            ]
        );
    }

    #[test]
    fn test_newline_inside_quotes_kept() {
        let records = parse_records("name,notes\nGala,\"line one\nline two\"\n").unwrap();
        assert_eq!(records[1][1], "line one\nline two");
    }

    #[test]
    fn test_unterminated_quote_is_error() {
        let err = parse_records("a,b\n1,\"oops\n2,3\n").unwrap_err();
        assert_eq!(err, CsvError::UnterminatedQuote(2));
    }

    #[test]
    fn test_bom_stripped() {
        let rows = parse_csv("\u{feff}ACNO,CULTIVAR NAME\nMAL0100,Honeycrisp\n", "x.csv").unwrap();
        assert_eq!(rows[0].get("ACNO"), Some("MAL0100"));
    }

    #[test]
    fn test_missing_trailing_fields_become_empty() {
        let rows = parse_csv("a,b,c\n1\n", "x.csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("a"), Some("1"));
        assert_eq!(rows[0].get("b"), Some(""));
        assert_eq!(rows[0].get("c"), Some(""));
    }

    #[test]
    fn test_rows_numbered_and_ordered() {
        let rows = parse_csv("id\nfirst\n\nsecond\nthird\n", "x.csv").unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.get("id").unwrap()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
        assert_eq!(rows[2].row_number, 3);
        assert_eq!(rows[2].origin, "x.csv");
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        assert!(parse_csv("a,b\n", "x.csv").unwrap().is_empty());
        assert!(parse_csv("", "x.csv").unwrap().is_empty());
    }
}
