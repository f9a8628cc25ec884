//! Error types for the slotting KPI pipeline.
//!
//! Every failure mode has a named variant. No stringly-typed errors.
//! The unreadable-inventory case is deliberately NOT here: a corrupt
//! optional input is a recoverable outcome (`InventorySource::Unreadable`),
//! not a failure.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Required input not found ({what}): {path}")]
    MissingInput { what: &'static str, path: PathBuf },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History schema mismatch: expected columns [{expected}], found [{found}]")]
    HistorySchemaMismatch { expected: String, found: String },
}

/// Result type alias for KPI pipeline operations.
pub type MetricsResult<T> = Result<T, MetricsError>;
