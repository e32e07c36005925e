//! Tabular dataset reader
//!
//! Produces [`RawRow`]s from CSV, JSON and spreadsheet files. Rows keep source
//! order within a file, since the import uses that order as the default sort.

pub mod csv;
pub mod json;
pub mod workbook;

use crate::error::{ImportError, ImportResult};
use crate::models::RawRow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File formats the reader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Workbook,
}

impl SourceFormat {
    /// Detect format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "json" => Some(SourceFormat::Json),
            "xlsx" | "xls" => Some(SourceFormat::Workbook),
            _ => None,
        }
    }
}

/// Dataset file reader
#[derive(Debug, Clone)]
pub struct TabularReader {
    sentinel_columns: Vec<String>,
}

impl TabularReader {
    /// Create reader with the default re-embedded header sentinels
    pub fn new() -> Self {
        Self {
            sentinel_columns: workbook::DEFAULT_SENTINEL_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Read one dataset file
    ///
    /// Missing files, unknown extensions and parse failures are all errors.
    pub fn read_file(&self, path: &Path) -> ImportResult<Vec<RawRow>> {
        if !path.is_file() {
            return Err(ImportError::SourceNotFound(path.to_path_buf()));
        }

        let format = SourceFormat::from_path(path).ok_or_else(|| {
            ImportError::UnsupportedFormat(
                path.extension()
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string()),
            )
        })?;

        let origin = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let rows = match format {
            SourceFormat::Csv => {
                let text = read_text(path)?;
                csv::parse_csv(&text, &origin).map_err(|e| ImportError::parse(path, e))?
            }
            SourceFormat::Json => {
                let text = read_text(path)?;
                json::parse_json(&text, &origin).map_err(|e| ImportError::parse(path, e))?
            }
            SourceFormat::Workbook => workbook::read_workbook(path, &self.sentinel_columns)?,
        };

        debug!(path = %path.display(), rows = rows.len(), "Read dataset file");
        Ok(rows)
    }

    /// Read every dataset file in a directory
    ///
    /// A missing directory is created and yields no rows. Files are read in
    /// file-name order; a file that fails to read is logged and skipped.
    pub fn read_directory(&self, dir: &Path) -> ImportResult<Vec<RawRow>> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            info!("Created data directory {}", dir.display());
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!("Error accessing entry in {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|path| path.is_file() && SourceFormat::from_path(path).is_some())
            .collect();
        files.sort();

        let mut rows = Vec::new();
        for path in files {
            match self.read_file(&path) {
                Ok(file_rows) => rows.extend(file_rows),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable dataset file"),
            }
        }

        Ok(rows)
    }
}

impl Default for TabularReader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_text(path: &Path) -> ImportResult<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
