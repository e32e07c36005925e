//! Bulk import results
//!
//! Counters and per-row failures collected during one run, printed as the
//! console summary and persisted to `import_runs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// A row whose insert failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    /// 1-based data row within `origin`
    pub row_number: usize,
    /// Source file (or `file#sheet`)
    pub origin: String,
    /// Best-effort identifying name
    pub name: String,
    /// Underlying error message
    pub message: String,
}

/// Outcome of one bulk import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: Uuid,
    pub source_path: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Rows read from the source
    pub total_rows: usize,
    /// Records now in the catalogue
    pub imported: usize,
    /// Rows dropped for lacking a cultivar name
    pub skipped: usize,
    /// Rows whose insert failed
    pub failed: usize,
    pub images_scanned: usize,
    /// Images linked to at least one record
    pub images_linked: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    pub fn new(source_path: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            source_path: source_path.into(),
            started_at: now,
            ended_at: now,
            total_rows: 0,
            imported: 0,
            skipped: 0,
            failed: 0,
            images_scanned: 0,
            images_linked: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_failure(&mut self, failure: RowFailure) {
        self.failed += 1;
        self.failures.push(failure);
    }

    pub fn finish(&mut self) {
        self.ended_at = Utc::now();
    }

    pub fn elapsed(&self) -> Duration {
        (self.ended_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Imported records per second (0 when nothing measurable elapsed)
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.imported as f64 / secs
        } else {
            0.0
        }
    }

    /// Human-readable summary, one line per entry
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Import {} from {}", self.run_id, self.source_path),
            format!("  Rows read:      {}", self.total_rows),
            format!("  Imported:       {}", self.imported),
            format!("  Skipped:        {}", self.skipped),
            format!("  Errors:         {}", self.failed),
            format!(
                "  Images linked:  {} of {}",
                self.images_linked, self.images_scanned
            ),
            format!("  Elapsed:        {:.2}s", self.elapsed().as_secs_f64()),
            format!("  Throughput:     {:.1} records/s", self.throughput()),
        ];

        for failure in &self.failures {
            lines.push(format!(
                "  ! row {} ({}) in {}: {}",
                failure.row_number, failure.name, failure.origin, failure.message
            ));
        }

        lines
    }

    pub fn display_string(&self) -> String {
        self.summary_lines().join("\n")
    }
}
