//! appleverse-import library interface
//!
//! The import pipeline behind the `appleverse-import` binary, exposed for
//! integration testing and for embedding in other tools.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ImportError, ImportResult};
