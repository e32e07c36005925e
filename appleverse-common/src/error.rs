//! Error type shared by the AppleVerse crates

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite pool, schema or query failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or unparsable TOML bootstrap file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Setting outside its allowed range
    #[error("Invalid setting: {0}")]
    InvalidInput(String),

    /// Stored catalogue data that no longer decodes (JSON columns, UUIDs, timestamps)
    #[error("Corrupt stored data: {0}")]
    Internal(String),
}
