//! Slotting KPI engine.
//!
//! Computes operational KPIs for a warehouse slotting process from three
//! CSV inputs (placement recommendations, location layout, optional
//! inventory) and appends timestamped snapshots to a metrics history table.
//!
//! The undefined-value policy is the load-bearing design decision: every
//! ratio or mean whose preconditions are unmet (empty group, zero or
//! missing denominator, absent column) is `None`, never an error and
//! never omitted from the snapshot. One corrupt optional input must not
//! take down the whole KPI vector.

pub mod engine;
pub mod error;
pub mod history;
pub mod loader;
pub mod snapshot;
pub mod tables;

pub use engine::{compute_kpis, compute_kpis_now};
pub use error::{MetricsError, MetricsResult};
pub use history::{append_snapshot, read_history};
pub use loader::{load_tables, InputPaths};
pub use snapshot::KpiSnapshot;
pub use tables::{
    InventoryRow, InventorySource, InventoryTable, LayoutRow, LayoutTable, PlacementRow,
    PlacementsTable,
};
