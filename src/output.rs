//! Output of ledger snapshots.
//!
//! Supports JSON logging and CSV history append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::feeds::BucketKey;
use crate::ledger::LedgerSnapshot;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One CSV history row.
#[derive(Debug, Serialize)]
pub struct LedgerRecord {
    pub recorded_at: DateTime<Utc>,
    pub bucket: BucketKey,
    pub count: usize,
    pub generated_at: Option<i64>,
}

/// Flattens a snapshot into history rows stamped with `recorded_at`.
pub fn snapshot_records(snapshot: &LedgerSnapshot, recorded_at: DateTime<Utc>) -> Vec<LedgerRecord> {
    snapshot
        .iter()
        .map(|(bucket, entry)| LedgerRecord {
            recorded_at,
            bucket: *bucket,
            count: entry.count,
            generated_at: entry.generated_at,
        })
        .collect()
}

/// Logs a snapshot as pretty-printed JSON.
pub fn print_json(snapshot: &LedgerSnapshot) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}

/// Appends one row per bucket of `snapshot` to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_snapshot(path: &str, snapshot: &LedgerSnapshot) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending ledger history");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for record in snapshot_records(snapshot, Utc::now()) {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}
