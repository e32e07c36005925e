//! Image file scanner
//!
//! Discovers cultivar photos in the configured image directories and pairs
//! each with the path it is served under.

use crate::models::ImageFile;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Image scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// An image directory and the URL prefix its files are served under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub dir: PathBuf,
    pub url_prefix: String,
}

impl ImageSource {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// Serving path for a file at `relative` inside this source
    pub fn serving_path(&self, relative: &Path) -> String {
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), relative)
    }
}

/// Image file scanner
pub struct ImageScanner {
    ignore_patterns: Vec<String>,
    max_depth: Option<usize>,
}

impl ImageScanner {
    /// Create new scanner with default ignore patterns
    ///
    /// Ignores system files like .DS_Store, Thumbs.db, .git and hidden files.
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
            ],
            max_depth: None,
        }
    }

    /// Limit directory recursion depth (1 = only the directory itself)
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Scan all sources, sorted by serving path
    ///
    /// A source that cannot be scanned is logged and contributes nothing.
    pub fn scan(&self, sources: &[ImageSource]) -> Vec<ImageFile> {
        let mut images = Vec::new();

        for source in sources {
            match self.scan_source(source) {
                Ok(found) => {
                    tracing::debug!(
                        dir = %source.dir.display(),
                        count = found.len(),
                        "Scanned image directory"
                    );
                    images.extend(found);
                }
                Err(e) => tracing::warn!("Skipping image directory: {}", e),
            }
        }

        images.sort_by(|a, b| a.path.cmp(&b.path));
        images
    }

    /// Scan a single image directory
    pub fn scan_source(&self, source: &ImageSource) -> Result<Vec<ImageFile>, ScanError> {
        let root = source.dir.as_path();
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let walker = WalkDir::new(root)
            .follow_links(false)
            .max_depth(self.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, root));

        let mut images = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() || !self.is_image_file(entry.path()) {
                        continue;
                    }
                    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                    images.push(ImageFile::new(
                        entry.file_name().to_string_lossy(),
                        source.serving_path(relative),
                    ));
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        Ok(images)
    }

    fn should_process_entry(&self, entry: &DirEntry, root: &Path) -> bool {
        if entry.path() == root {
            return true;
        }

        let file_name = entry.file_name().to_string_lossy();
        if file_name.starts_with('.') {
            return false;
        }

        !self
            .ignore_patterns
            .iter()
            .any(|pattern| file_name.contains(pattern.as_str()))
    }

    fn is_image_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| self.is_image_extension(&ext.to_string_lossy().to_lowercase()))
            .unwrap_or(false)
    }

    /// Check if extension is a supported image type
    fn is_image_extension(&self, ext: &str) -> bool {
        matches!(ext, "jpg" | "jpeg" | "png" | "webp" | "gif")
    }
}

impl Default for ImageScanner {
    fn default() -> Self {
        Self::new()
    }
}
