//! Canonical record persistence
//!
//! A new generation is written to the staging table first and then swapped
//! into the catalogue table in one transaction, so readers never observe an
//! empty catalogue.

use crate::models::CanonicalRecord;
use appleverse_common::db::{RECORDS_TABLE, STAGING_TABLE};
use appleverse_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;

const RECORD_COLUMNS: &str = "source_row_index, accession_code, cultivar_name, accession_number, \
     genus, species, country, province, city, pedigree_description, images, metadata";

/// Record as stored in the catalogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: i64,
    pub source_row_index: i64,
    pub record: CanonicalRecord,
}

/// Remove everything from the staging table
pub async fn clear_staging(pool: &SqlitePool) -> Result<()> {
    sqlx::query(&format!("DELETE FROM {STAGING_TABLE}"))
        .execute(pool)
        .await?;
    Ok(())
}

/// Insert one record into the staging table
pub async fn insert_staged(
    pool: &SqlitePool,
    record: &CanonicalRecord,
    source_row_index: i64,
) -> Result<()> {
    let images = serde_json::to_string(&record.images)
        .map_err(|e| Error::Internal(format!("Failed to encode images: {}", e)))?;
    let metadata = serde_json::to_string(&record.metadata)
        .map_err(|e| Error::Internal(format!("Failed to encode metadata: {}", e)))?;

    let sql = format!(
        "INSERT INTO {STAGING_TABLE} ({RECORD_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    );
    sqlx::query(&sql)
        .bind(source_row_index)
        .bind(&record.accession_code)
        .bind(&record.cultivar_name)
        .bind(&record.accession_number)
        .bind(&record.genus)
        .bind(&record.species)
        .bind(&record.country)
        .bind(&record.province)
        .bind(&record.city)
        .bind(&record.pedigree_description)
        .bind(images)
        .bind(metadata)
        .execute(pool)
        .await?;

    Ok(())
}

/// Replace the catalogue with the staged generation
///
/// Delete, copy and staging cleanup run in one transaction. Returns the
/// number of records now in the catalogue.
pub async fn swap_in_staged(pool: &SqlitePool) -> Result<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query(&format!("DELETE FROM {RECORDS_TABLE}"))
        .execute(&mut *tx)
        .await?;

    let copied = sqlx::query(&format!(
        "INSERT INTO {RECORDS_TABLE} ({RECORD_COLUMNS}, imported_at) \
         SELECT {RECORD_COLUMNS}, imported_at FROM {STAGING_TABLE} ORDER BY source_row_index"
    ))
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query(&format!("DELETE FROM {STAGING_TABLE}"))
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(records = copied, "Swapped staged records into catalogue");
    Ok(copied)
}

/// Number of records in the catalogue
pub async fn count_records(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {RECORDS_TABLE}"))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Page through the catalogue in source order
pub async fn list_records(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<StoredRecord>> {
    let rows = sqlx::query(&format!(
        "SELECT id, {RECORD_COLUMNS} FROM {RECORDS_TABLE} \
         ORDER BY source_row_index, id LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

/// All records carrying `accession_code` (case-insensitive)
pub async fn find_by_accession_code(pool: &SqlitePool, accession_code: &str) -> Result<Vec<StoredRecord>> {
    let rows = sqlx::query(&format!(
        "SELECT id, {RECORD_COLUMNS} FROM {RECORDS_TABLE} \
         WHERE accession_code = ? COLLATE NOCASE ORDER BY source_row_index, id"
    ))
    .bind(accession_code.trim())
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

fn row_to_record(row: &SqliteRow) -> Result<StoredRecord> {
    let images_json: String = row.get("images");
    let metadata_json: String = row.get("metadata");

    let images: Vec<String> = serde_json::from_str(&images_json)
        .map_err(|e| Error::Internal(format!("Invalid images JSON in database: {}", e)))?;
    let metadata: BTreeMap<String, String> = serde_json::from_str(&metadata_json)
        .map_err(|e| Error::Internal(format!("Invalid metadata JSON in database: {}", e)))?;

    Ok(StoredRecord {
        id: row.get("id"),
        source_row_index: row.get("source_row_index"),
        record: CanonicalRecord {
            accession_code: row.get("accession_code"),
            cultivar_name: row.get("cultivar_name"),
            accession_number: row.get("accession_number"),
            genus: row.get("genus"),
            species: row.get("species"),
            country: row.get("country"),
            province: row.get("province"),
            city: row.get("city"),
            pedigree_description: row.get("pedigree_description"),
            images,
            metadata,
        },
    })
}
