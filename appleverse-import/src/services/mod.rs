//! Service modules for the dataset import pipeline

pub mod bulk_importer;
pub mod dataset_locator;
pub mod field_normalizer;
pub mod image_matcher;
pub mod image_scanner;
pub mod tabular_reader;

pub use bulk_importer::{BulkImporter, ImportOptions, DEFAULT_BATCH_SIZE};
pub use dataset_locator::{is_dataset_candidate, locate_dataset};
pub use field_normalizer::FieldNormalizer;
pub use image_matcher::{ImageMatcher, MatchRule, MatchStats};
pub use image_scanner::{ImageScanner, ImageSource, ScanError};
pub use tabular_reader::{SourceFormat, TabularReader};
