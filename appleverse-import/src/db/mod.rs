//! Catalogue persistence
//!
//! Connection setup and table creation live in `appleverse_common::db`.

pub mod import_runs;
pub mod records;

pub use appleverse_common::db::init_database;
