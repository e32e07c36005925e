//! Data models for the dataset import pipeline

pub mod aliases;
pub mod import_report;
pub mod record;

pub use aliases::{AliasTable, CanonicalField};
pub use import_report::{ImportReport, RowFailure};
pub use record::{normalized_image_key, CanonicalRecord, ImageFile, RawRow, DEFAULT_GENUS};
