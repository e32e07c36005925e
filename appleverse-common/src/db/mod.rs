//! Database initialization and catalogue schema

pub mod init;

pub use init::*;
