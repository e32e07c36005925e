//! Row and record types flowing through the import pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Genus used when a row names none
pub const DEFAULT_GENUS: &str = "Malus";

/// One source row: column labels exactly as they appeared in the file
///
/// Columns keep source order. Duplicate labels are kept; lookups return the
/// first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// File (or `file#sheet`) the row came from
    pub origin: String,
    /// 1-based data row number within `origin`
    pub row_number: usize,
    columns: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(origin: impl Into<String>, row_number: usize) -> Self {
        Self {
            origin: origin.into(),
            row_number,
            columns: Vec::new(),
        }
    }

    /// Build a row from `(label, value)` pairs
    pub fn from_pairs<L, V>(origin: impl Into<String>, row_number: usize, pairs: impl IntoIterator<Item = (L, V)>) -> Self
    where
        L: Into<String>,
        V: Into<String>,
    {
        let mut row = Self::new(origin, row_number);
        for (label, value) in pairs {
            row.push(label, value);
        }
        row
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.columns.push((label.into(), value.into()));
    }

    /// Value of the first column labelled exactly `label`
    pub fn get(&self, label: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Normalized apple cultivar entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub accession_code: String,
    pub cultivar_name: String,
    pub accession_number: String,
    pub genus: String,
    pub species: String,
    pub country: String,
    pub province: String,
    pub city: String,
    pub pedigree_description: String,
    /// Serving paths of linked images, at most one per normalized filename
    pub images: Vec<String>,
    /// Source columns not mapped onto a canonical field, keyed by original label
    pub metadata: BTreeMap<String, String>,
}

impl Default for CanonicalRecord {
    fn default() -> Self {
        Self {
            accession_code: String::new(),
            cultivar_name: String::new(),
            accession_number: String::new(),
            genus: DEFAULT_GENUS.to_string(),
            species: String::new(),
            country: String::new(),
            province: String::new(),
            city: String::new(),
            pedigree_description: String::new(),
            images: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }
}

impl CanonicalRecord {
    pub fn has_cultivar_name(&self) -> bool {
        !self.cultivar_name.trim().is_empty()
    }

    /// Best-effort identifying name for log lines
    pub fn display_name(&self) -> &str {
        if self.has_cultivar_name() {
            &self.cultivar_name
        } else if !self.accession_code.is_empty() {
            &self.accession_code
        } else {
            "<unnamed>"
        }
    }

    /// Append an image unless one with the same normalized filename is present
    ///
    /// Returns true when the image was added.
    pub fn add_image(&mut self, path: &str) -> bool {
        let key = normalized_image_key(path);
        if key.is_empty() {
            return false;
        }
        if self
            .images
            .iter()
            .any(|existing| normalized_image_key(existing) == key)
        {
            return false;
        }
        self.images.push(path.to_string());
        true
    }
}

/// Image file discovered on disk
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImageFile {
    /// File name on disk
    pub name: String,
    /// Serving path, e.g. `/images/King MAL0101.JPG`
    pub path: String,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Dedup key for an image reference
///
/// Case-folded file name with any URL prefix, query string, fragment and
/// extension removed: `/images/King MAL0101.JPG?v=2` → `king mal0101`.
pub fn normalized_image_key(path: &str) -> String {
    let without_query = path.split(['?', '#']).next().unwrap_or_default();
    let file_name = without_query
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    strip_extension(file_name).trim().to_lowercase()
}

/// Drop a trailing `.ext` when the extension is a plain alphanumeric token
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_has_malus_genus() {
        let record = CanonicalRecord::default();
        assert_eq!(record.genus, "Malus");
        assert!(!record.has_cultivar_name());
    }

    #[test]
    fn test_normalized_image_key() {
        assert_eq!(normalized_image_key("King MAL0101.JPG"), "king mal0101");
        assert_eq!(normalized_image_key("/images/King MAL0101.JPG"), "king mal0101");
        assert_eq!(
            normalized_image_key("https://cdn.example.org/data/king mal0101.jpg?v=3"),
            "king mal0101"
        );
        assert_eq!(normalized_image_key("C:\\photos\\Gala.png"), "gala");
        assert_eq!(normalized_image_key("no_extension"), "no_extension");
    }

    #[test]
    fn test_add_image_dedup_is_idempotent() {
        let mut record = CanonicalRecord::default();
        assert!(record.add_image("/images/King MAL0101.JPG"));
        assert!(!record.add_image("/images/King MAL0101.JPG"));
        assert!(!record.add_image("/data/king mal0101.jpg"));
        assert!(!record.add_image("/images/KING MAL0101.png"));
        assert_eq!(record.images, vec!["/images/King MAL0101.JPG".to_string()]);

        assert!(record.add_image("/images/King MAL0101 side.jpg"));
        assert_eq!(record.images.len(), 2);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut record = CanonicalRecord::default();
        assert_eq!(record.display_name(), "<unnamed>");
        record.accession_code = "MAL0100".to_string();
        assert_eq!(record.display_name(), "MAL0100");
        record.cultivar_name = "Honeycrisp".to_string();
        assert_eq!(record.display_name(), "Honeycrisp");
    }

    #[test]
    fn test_raw_row_lookup_returns_first_duplicate() {
        let row = RawRow::from_pairs("test.csv", 1, [("ACNO", "A"), ("ACNO", "B")]);
        assert_eq!(row.get("ACNO"), Some("A"));
        assert_eq!(row.len(), 2);
    }
}
