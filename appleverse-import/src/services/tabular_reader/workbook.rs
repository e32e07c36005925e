//! Spreadsheet workbooks (xlsx/xls)
//!
//! Sheets are read in a fixed priority order because the early sheets carry
//! the denser, authoritative columns. Empty rows and header rows re-embedded
//! mid-sheet are dropped.

use crate::error::{ImportError, ImportResult};
use crate::models::RawRow;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Sheets processed first, in this order; all others follow in workbook order
pub const SHEET_PRIORITY: &[&str] = &["Accession", "Pedigree", "Descriptors", "Accession Source"];

/// Cell value marking a re-embedded header row anywhere it appears
pub const SYNC_SENTINEL: &str = "SYNCHRONIZATION";

/// Columns whose value equals their own label on re-embedded header rows
pub const DEFAULT_SENTINEL_COLUMNS: &[&str] = &["SYNCHRONIZATION", "ACNO", "ACCESSION"];

/// Order sheet names: priority sheets first, then the rest as given
pub fn order_sheets(names: &[String]) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::with_capacity(names.len());

    for wanted in SHEET_PRIORITY {
        for name in names {
            if name.trim().eq_ignore_ascii_case(wanted) && !ordered.contains(name) {
                ordered.push(name.clone());
            }
        }
    }

    for name in names {
        if !ordered.contains(name) {
            ordered.push(name.clone());
        }
    }

    ordered
}

/// Render a cell as the string a spreadsheet user would see
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Turn one sheet's cell grid into rows
///
/// The first non-empty row is the header.
pub fn grid_to_rows(grid: Vec<Vec<String>>, origin: &str, sentinel_columns: &[String]) -> Vec<RawRow> {
    let mut iter = grid
        .into_iter()
        .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()));

    let headers: Vec<String> = match iter.next() {
        Some(header) => header.into_iter().map(|h| h.trim().to_string()).collect(),
        None => return Vec::new(),
    };

    let mut rows = Vec::new();
    let mut row_number = 0;
    for cells in iter {
        row_number += 1;
        if is_embedded_header(&headers, &cells, sentinel_columns) {
            tracing::debug!(origin, row = row_number, "Dropping re-embedded header row");
            continue;
        }

        let mut row = RawRow::new(origin, row_number);
        for (idx, label) in headers.iter().enumerate() {
            if label.is_empty() {
                continue;
            }
            row.push(label.clone(), cells.get(idx).cloned().unwrap_or_default());
        }
        rows.push(row);
    }

    rows
}

fn is_embedded_header(headers: &[String], cells: &[String], sentinel_columns: &[String]) -> bool {
    if cells
        .iter()
        .any(|c| c.trim().eq_ignore_ascii_case(SYNC_SENTINEL))
    {
        return true;
    }

    headers.iter().zip(cells).any(|(label, value)| {
        let value = value.trim();
        !value.is_empty()
            && value.eq_ignore_ascii_case(label)
            && sentinel_columns
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(label))
    })
}

/// Read every sheet of a workbook in priority order
pub fn read_workbook(path: &Path, sentinel_columns: &[String]) -> ImportResult<Vec<RawRow>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::parse(path, e))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let sheet_names = workbook.sheet_names().to_vec();
    let mut rows = Vec::new();

    for sheet in order_sheets(&sheet_names) {
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| ImportError::parse(path, format!("sheet '{}': {}", sheet, e)))?;

        let grid: Vec<Vec<String>> = range
            .rows()
            .map(|cells| cells.iter().map(cell_to_string).collect())
            .collect();

        let origin = format!("{}#{}", file_name, sheet);
        let sheet_rows = grid_to_rows(grid, &origin, sentinel_columns);
        tracing::debug!(sheet = %sheet, rows = sheet_rows.len(), "Read worksheet");
        rows.extend(sheet_rows);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sentinels() -> Vec<String> {
        names(DEFAULT_SENTINEL_COLUMNS)
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter().map(|r| names(r)).collect()
    }

    #[test]
    fn test_priority_sheets_first() {
        let ordered = order_sheets(&names(&["Notes", "Descriptors", "Extra", "Accession", "Pedigree"]));
        assert_eq!(ordered, names(&["Accession", "Pedigree", "Descriptors", "Notes", "Extra"]));
    }

    #[test]
    fn test_priority_match_is_case_insensitive() {
        let ordered = order_sheets(&names(&["notes", " accession source", "ACCESSION"]));
        assert_eq!(ordered, names(&["ACCESSION", " accession source", "notes"]));
    }

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    #[test]
    fn test_read_workbook_priority_sheet_first() {
        // "Notes" is the first sheet in the file, "Accession" the second
        let rows = read_workbook(&fixture("accessions.xlsx"), &sentinels()).unwrap();

        let names: Vec<_> = rows.iter().map(|r| r.get("CULTIVAR NAME").unwrap()).collect();
        assert_eq!(names, vec!["Honeycrisp", "Gala", "Notes Pippin"]);
        assert_eq!(rows[0].origin, "accessions.xlsx#Accession");
        assert_eq!(rows[2].origin, "accessions.xlsx#Notes");
    }

    #[test]
    fn test_read_workbook_renders_numbers_and_drops_header_rows() {
        let rows = read_workbook(&fixture("accessions.xlsx"), &sentinels()).unwrap();

        let accession: Vec<_> = rows.iter().filter(|r| r.origin.ends_with("#Accession")).collect();
        assert_eq!(accession.len(), 2);
        assert_eq!(accession[0].get("ACNO"), Some("MAL0100"));
        assert_eq!(accession[0].get("ACCESSION"), Some("622"));
        assert_eq!(accession[1].get("ACCESSION"), Some("623"));
    }

    #[test]
    fn test_empty_and_reembedded_header_rows_dropped() {
        let cells = grid(&[
            &["", ""],
            &["ACNO", "CULTIVAR NAME"],
            &["MAL0100", "Honeycrisp"],
            &["", "  "],
            &["ACNO", "CULTIVAR NAME"],
            &["SYNCHRONIZATION", ""],
            &["MAL0101", "Gala"],
        ]);

        let rows = grid_to_rows(cells, "book.xlsx#Accession", &sentinels());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("ACNO"), Some("MAL0100"));
        assert_eq!(rows[1].get("CULTIVAR NAME"), Some("Gala"));
    }

    #[test]
    fn test_value_equal_to_non_sentinel_label_kept() {
        let cells = grid(&[&["ACNO", "COUNTRY"], &["MAL0200", "COUNTRY"]]);
        let rows = grid_to_rows(cells, "book.xlsx#Accession", &sentinels());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell_to_string(&Data::Float(622.0)), "622");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("Gala".into())), "Gala");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_unreadable_workbook_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        match read_workbook(&path, &sentinels()) {
            Err(ImportError::Parse { .. }) => {}
            other => panic!("Expected Parse error, got {:?}", other.map(|r| r.len())),
        }
    }
}
