//! # AppleVerse Common Library
//!
//! Shared code for the AppleVerse catalogue tools:
//! - Error type
//! - Configuration loading and root folder resolution
//! - SQLite pool initialization and catalogue schema

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
