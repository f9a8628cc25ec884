//! The KPI snapshot record.
//!
//! One snapshot is one row of the metrics history table: a capture
//! timestamp plus the eleven KPI fields in fixed column order. `None`
//! is the explicit undefined marker; it serialises as an empty CSV
//! field and renders as `NaN` in the human-readable summary.

use serde::{Deserialize, Serialize};

/// History-table column order. Must match the field order of
/// [`KpiSnapshot`]; the schema check in the history appender compares
/// file headers against this list.
pub const COLUMNS: [&str; 12] = [
    "timestamp",
    "rows",
    "placed_rows",
    "avg_distance",
    "weighted_distance",
    "unplaced_rate",
    "avg_cube_utilization",
    "fragmentation_rate",
    "total_allocated_volume",
    "capacity_ratio",
    "free_effective_capacity_ratio",
    "placements_with_capacity_cols_ratio",
];

/// One computed KPI vector with its capture timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    /// Capture instant, ISO-8601 UTC.
    pub timestamp: String,
    /// Total placement rows loaded.
    pub rows: u64,
    /// Rows with a real location (present and not the UNPLACED sentinel).
    pub placed_rows: u64,
    pub avg_distance: Option<f64>,
    pub weighted_distance: Option<f64>,
    pub unplaced_rate: Option<f64>,
    pub avg_cube_utilization: Option<f64>,
    pub fragmentation_rate: Option<f64>,
    /// Always defined; 0.0 when no row carries an allocated volume.
    pub total_allocated_volume: f64,
    pub capacity_ratio: Option<f64>,
    pub free_effective_capacity_ratio: Option<f64>,
    pub placements_with_capacity_cols_ratio: Option<f64>,
}

/// Render an optional metric for the human-readable summary.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "NaN".to_string(),
    }
}

impl KpiSnapshot {
    /// Every field as a (column, rendered value) pair, in column order.
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("timestamp", self.timestamp.clone()),
            ("rows", self.rows.to_string()),
            ("placed_rows", self.placed_rows.to_string()),
            ("avg_distance", format_metric(self.avg_distance)),
            ("weighted_distance", format_metric(self.weighted_distance)),
            ("unplaced_rate", format_metric(self.unplaced_rate)),
            (
                "avg_cube_utilization",
                format_metric(self.avg_cube_utilization),
            ),
            ("fragmentation_rate", format_metric(self.fragmentation_rate)),
            (
                "total_allocated_volume",
                format_metric(Some(self.total_allocated_volume)),
            ),
            ("capacity_ratio", format_metric(self.capacity_ratio)),
            (
                "free_effective_capacity_ratio",
                format_metric(self.free_effective_capacity_ratio),
            ),
            (
                "placements_with_capacity_cols_ratio",
                format_metric(self.placements_with_capacity_cols_ratio),
            ),
        ]
    }
}
