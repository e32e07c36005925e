//! Bulk dataset import
//!
//! Read → normalize → link images → stage → swap. The new generation is
//! built in the staging table and swapped into the catalogue in a single
//! transaction, so readers see either the old or the new catalogue.
//!
//! Inserts run concurrently within a batch and batches run one after another,
//! which bounds in-flight writes to one batch. A failed insert is logged and
//! reported but never aborts the run.

use crate::db::{import_runs, records as record_store};
use crate::error::{ImportError, ImportResult};
use crate::models::{CanonicalRecord, ImportReport, RawRow, RowFailure};
use crate::services::field_normalizer::FieldNormalizer;
use crate::services::image_matcher::ImageMatcher;
use crate::services::image_scanner::{ImageScanner, ImageSource};
use crate::services::tabular_reader::TabularReader;
use futures::future::join_all;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Default number of concurrent inserts per batch
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Import tuning and image locations
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub batch_size: usize,
    pub image_sources: Vec<ImageSource>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            image_sources: Vec::new(),
        }
    }
}

/// Where a kept record came from
#[derive(Debug, Clone)]
struct RowOrigin {
    source_row_index: i64,
    row_number: usize,
    origin: String,
}

/// Bulk importer
pub struct BulkImporter {
    db: SqlitePool,
    reader: TabularReader,
    normalizer: FieldNormalizer,
    matcher: ImageMatcher,
    options: ImportOptions,
}

impl BulkImporter {
    pub fn new(db: SqlitePool, options: ImportOptions) -> Self {
        Self {
            db,
            reader: TabularReader::new(),
            normalizer: FieldNormalizer::default(),
            matcher: ImageMatcher::new(),
            options,
        }
    }

    /// Replace the catalogue with the contents of `path`
    pub async fn import_file(&self, path: &Path) -> ImportResult<ImportReport> {
        info!("Reading dataset {}", path.display());

        let reader = self.reader.clone();
        let owned = path.to_path_buf();
        let rows = tokio::task::spawn_blocking(move || reader.read_file(&owned))
            .await
            .map_err(|e| ImportError::Internal(format!("Reader task failed: {}", e)))??;

        self.import_rows(path, rows).await
    }

    /// Replace the catalogue with already-read rows
    ///
    /// `source` is only used for reporting.
    pub async fn import_rows(&self, source: &Path, rows: Vec<RawRow>) -> ImportResult<ImportReport> {
        let mut report = ImportReport::new(source.display().to_string());
        report.total_rows = rows.len();

        let mut origins = Vec::with_capacity(rows.len());
        let mut records: Vec<CanonicalRecord> = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let record = self.normalizer.normalize(row);
            if !record.has_cultivar_name() {
                report.skipped += 1;
                debug!(row = row.row_number, origin = %row.origin, "Skipping row without cultivar name");
                continue;
            }
            origins.push(RowOrigin {
                source_row_index: idx as i64,
                row_number: row.row_number,
                origin: row.origin.clone(),
            });
            records.push(record);
        }

        if records.is_empty() {
            return Err(ImportError::NoUsableRows(source.to_path_buf()));
        }

        info!(
            rows = report.total_rows,
            usable = records.len(),
            skipped = report.skipped,
            "Normalized dataset rows"
        );

        let sources = self.options.image_sources.clone();
        let images = tokio::task::spawn_blocking(move || ImageScanner::new().scan(&sources))
            .await
            .map_err(|e| ImportError::Internal(format!("Image scan task failed: {}", e)))?;

        let stats = self.matcher.link_images(&mut records, &images);
        report.images_scanned = stats.images_scanned;
        report.images_linked = stats.images_linked;
        info!("Image matching: {}", stats.display_string());

        record_store::clear_staging(&self.db).await?;
        self.stage_records(&origins, &records, &mut report).await;

        if report.imported == 0 {
            if let Err(e) = record_store::clear_staging(&self.db).await {
                warn!("Failed to clear staging table: {}", e);
            }
            return Err(ImportError::NothingImported);
        }

        let swapped = record_store::swap_in_staged(&self.db).await?;
        report.imported = swapped as usize;
        report.finish();

        if let Err(e) = import_runs::save_import_run(&self.db, &report).await {
            warn!("Failed to record import run: {}", e);
        }

        info!(
            imported = report.imported,
            skipped = report.skipped,
            failed = report.failed,
            elapsed_ms = report.elapsed().as_millis() as u64,
            "Import complete"
        );

        Ok(report)
    }

    /// Insert records into staging, one batch at a time
    async fn stage_records(
        &self,
        origins: &[RowOrigin],
        records: &[CanonicalRecord],
        report: &mut ImportReport,
    ) {
        let batch_size = self.options.batch_size.max(1);
        let total_batches = records.len().div_ceil(batch_size);
        let db = &self.db;

        for (batch_idx, (origin_chunk, record_chunk)) in origins
            .chunks(batch_size)
            .zip(records.chunks(batch_size))
            .enumerate()
        {
            let results = join_all(origin_chunk.iter().zip(record_chunk).map(
                |(origin, record)| async move {
                    record_store::insert_staged(db, record, origin.source_row_index).await
                },
            ))
            .await;

            for ((origin, record), result) in origin_chunk.iter().zip(record_chunk).zip(results) {
                match result {
                    Ok(()) => report.imported += 1,
                    Err(e) => {
                        error!(
                            row = origin.row_number,
                            origin = %origin.origin,
                            name = %record.display_name(),
                            error = %e,
                            "Failed to import row"
                        );
                        report.record_failure(RowFailure {
                            row_number: origin.row_number,
                            origin: origin.origin.clone(),
                            name: record.display_name().to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }

            info!(
                batch = batch_idx + 1,
                batches = total_batches,
                imported = report.imported,
                failed = report.failed,
                "Batch complete"
            );
        }
    }
}
