//! Import run history

use crate::models::{ImportReport, RowFailure};
use appleverse_common::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Persist the report of a finished run
pub async fn save_import_run(pool: &SqlitePool, report: &ImportReport) -> Result<()> {
    let failures = serde_json::to_string(&report.failures)
        .map_err(|e| Error::Internal(format!("Failed to encode failures: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO import_runs (
            run_id, source_path, started_at, ended_at,
            total_rows, imported, skipped, failed,
            images_scanned, images_linked, failures
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(report.run_id.to_string())
    .bind(&report.source_path)
    .bind(format_timestamp(&report.started_at))
    .bind(format_timestamp(&report.ended_at))
    .bind(report.total_rows as i64)
    .bind(report.imported as i64)
    .bind(report.skipped as i64)
    .bind(report.failed as i64)
    .bind(report.images_scanned as i64)
    .bind(report.images_linked as i64)
    .bind(failures)
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recently started run, if any
pub async fn latest_import_run(pool: &SqlitePool) -> Result<Option<ImportReport>> {
    let row = sqlx::query(
        r#"
        SELECT run_id, source_path, started_at, ended_at,
               total_rows, imported, skipped, failed,
               images_scanned, images_linked, failures
        FROM import_runs
        ORDER BY started_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    let run_id: String = row.get("run_id");
    let failures_json: String = row.get("failures");
    let failures: Vec<RowFailure> = serde_json::from_str(&failures_json)
        .map_err(|e| Error::Internal(format!("Invalid failures JSON in database: {}", e)))?;

    Ok(Some(ImportReport {
        run_id: Uuid::parse_str(&run_id)
            .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))?,
        source_path: row.get("source_path"),
        started_at: parse_timestamp(row.get("started_at"))?,
        ended_at: parse_timestamp(row.get("ended_at"))?,
        total_rows: row.get::<i64, _>("total_rows") as usize,
        imported: row.get::<i64, _>("imported") as usize,
        skipped: row.get::<i64, _>("skipped") as usize,
        failed: row.get::<i64, _>("failed") as usize,
        images_scanned: row.get::<i64, _>("images_scanned") as usize,
        images_linked: row.get::<i64, _>("images_linked") as usize,
        failures,
    }))
}

/// Fixed-width RFC 3339 so text ordering matches time ordering
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: String) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid timestamp in database: {}", e)))
}
