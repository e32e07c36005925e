//! Database initialization
//!
//! Opens (or creates) the catalogue database and makes sure every table the
//! import pipeline relies on exists. Table creation is idempotent, so it is
//! safe to run on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Catalogue table read by the listing layer
pub const RECORDS_TABLE: &str = "apple_records";

/// Staging table a new generation is built in before being swapped in
pub const STAGING_TABLE: &str = "apple_records_staging";

/// Busy timeout applied to every pooled connection
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL lets listing readers proceed while an import writes
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all catalogue tables (idempotent)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_records_table(pool, RECORDS_TABLE).await?;
    create_records_table(pool, STAGING_TABLE).await?;
    create_import_runs_table(pool).await?;
    Ok(())
}

/// Create a table with the canonical record shape
///
/// `images` holds a JSON array of serving paths, `metadata` a JSON object of
/// unmapped source columns.
async fn create_records_table(pool: &SqlitePool, table: &str) -> Result<()> {
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_row_index INTEGER NOT NULL,
            accession_code TEXT NOT NULL DEFAULT '',
            cultivar_name TEXT NOT NULL CHECK (length(trim(cultivar_name)) > 0),
            accession_number TEXT NOT NULL DEFAULT '',
            genus TEXT NOT NULL DEFAULT 'Malus',
            species TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT '',
            province TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            pedigree_description TEXT NOT NULL DEFAULT '',
            images TEXT NOT NULL DEFAULT '[]',
            metadata TEXT NOT NULL DEFAULT '{{}}',
            imported_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#
    );
    sqlx::query(&sql).execute(pool).await?;

    let index_sql = format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_accession_code ON {table}(accession_code)"
    );
    sqlx::query(&index_sql).execute(pool).await?;

    let order_sql = format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_source_row ON {table}(source_row_index)"
    );
    sqlx::query(&order_sql).execute(pool).await?;

    Ok(())
}

/// Create the import_runs table (one row per bulk import)
async fn create_import_runs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS import_runs (
            run_id TEXT PRIMARY KEY,
            source_path TEXT NOT NULL,
            started_at TEXT NOT NULL,
            ended_at TEXT NOT NULL,
            total_rows INTEGER NOT NULL DEFAULT 0,
            imported INTEGER NOT NULL DEFAULT 0,
            skipped INTEGER NOT NULL DEFAULT 0,
            failed INTEGER NOT NULL DEFAULT 0,
            images_scanned INTEGER NOT NULL DEFAULT 0,
            images_linked INTEGER NOT NULL DEFAULT 0,
            failures TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
