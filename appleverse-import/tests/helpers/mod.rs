//! Shared fixtures for appleverse-import integration tests

#![allow(dead_code)]

use appleverse_common::db::init_database;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fresh database in a temporary directory
///
/// Keep the returned `TempDir` alive for as long as the pool is used.
pub async fn create_test_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pool = init_database(&temp_dir.path().join("appleverse.db"))
        .await
        .expect("Failed to initialize database");
    (temp_dir, pool)
}

/// Write `contents` to `dir/name`, creating `dir` if needed
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    std::fs::create_dir_all(dir).expect("Failed to create fixture dir");
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path
}

/// CSV with `rows` accessions; rows whose index is in `unnamed` lack a cultivar
pub fn accession_csv(rows: usize, unnamed: &[usize]) -> String {
    let mut csv = String::from("ACNO,CULTIVAR NAME,E_ORIGIN_COUNTRY\n");
    for i in 0..rows {
        let name = if unnamed.contains(&i) {
            String::new()
        } else {
            format!("Cultivar {}", i)
        };
        csv.push_str(&format!("MAL{:04},{},USA\n", i, name));
    }
    csv
}

/// Make the store reject staging inserts for one cultivar name
pub async fn reject_cultivar(pool: &SqlitePool, cultivar: &str) {
    let sql = format!(
        "CREATE TRIGGER reject_{trigger} BEFORE INSERT ON apple_records_staging \
         WHEN NEW.cultivar_name = '{cultivar}' \
         BEGIN SELECT RAISE(ABORT, 'rejected by test trigger'); END",
        trigger = cultivar.replace(|c: char| !c.is_ascii_alphanumeric(), "_"),
        cultivar = cultivar.replace('\'', "''"),
    );
    sqlx::query(&sql)
        .execute(pool)
        .await
        .expect("Failed to install trigger");
}
