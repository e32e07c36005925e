//! Dataset file discovery
//!
//! When no file is named on the command line, the import looks in the data
//! directory for the published "final dataset" workbook or CSV.

use crate::error::{ImportError, ImportResult};
use std::path::{Path, PathBuf};

const DATASET_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

/// True for names like `Apple_FINAL_Dataset_2024.xlsx`
pub fn is_dataset_candidate(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    let has_extension = Path::new(&lower)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            DATASET_EXTENSIONS.iter().any(|known| ext == *known)
        })
        .unwrap_or(false);

    has_extension && lower.contains("final") && lower.contains("dataset")
}

/// Find the dataset file in `data_dir` (first match in file-name order)
pub fn locate_dataset(data_dir: &Path) -> ImportResult<PathBuf> {
    if !data_dir.is_dir() {
        return Err(ImportError::SourceNotFound(data_dir.to_path_buf()));
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .map(|n| is_dataset_candidate(&n.to_string_lossy()))
                    .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    match candidates.into_iter().next() {
        Some(path) => {
            tracing::info!("Found dataset file {}", path.display());
            Ok(path)
        }
        None => Err(ImportError::SourceNotFound(data_dir.join("*final*dataset*"))),
    }
}
