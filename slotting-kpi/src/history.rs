//! The append-only metrics history table.
//!
//! One row per invocation. The file is rewritten in full on every
//! append: read everything, add the new row, write everything back.
//! O(history size) per run is acceptable at batch cadence and keeps the
//! schema trivially consistent. The schema itself is pinned to the
//! snapshot's column order; a drifted header fails loudly instead of
//! silently merging columns.

use std::fs::File;
use std::path::Path;

use crate::error::{MetricsError, MetricsResult};
use crate::snapshot::{KpiSnapshot, COLUMNS};

/// Read all snapshots from the history file.
///
/// Verifies the header against the current snapshot schema first, so a
/// history written by an incompatible release is rejected before any
/// row is interpreted.
pub fn read_history(path: &Path) -> MetricsResult<Vec<KpiSnapshot>> {
    let mut rdr = csv::Reader::from_reader(File::open(path)?);
    check_schema(rdr.headers()?)?;
    let mut snapshots = Vec::new();
    for result in rdr.deserialize() {
        snapshots.push(result?);
    }
    Ok(snapshots)
}

/// Persist one snapshot as a new history row.
///
/// Creates the file with a header if absent; otherwise reads the full
/// history, appends, and rewrites.
pub fn append_snapshot(path: &Path, snapshot: &KpiSnapshot) -> MetricsResult<()> {
    let mut snapshots = if path.exists() {
        read_history(path)?
    } else {
        Vec::new()
    };
    snapshots.push(snapshot.clone());

    let mut wtr = csv::Writer::from_writer(File::create(path)?);
    for row in &snapshots {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn check_schema(headers: &csv::StringRecord) -> MetricsResult<()> {
    if headers.iter().eq(COLUMNS.iter().copied()) {
        return Ok(());
    }
    Err(MetricsError::HistorySchemaMismatch {
        expected: COLUMNS.join(","),
        found: headers.iter().collect::<Vec<_>>().join(","),
    })
}
