//! CSV table loading for the three slotting inputs.
//!
//! Parses placement, layout and inventory CSV files into typed row
//! structs. Optional numeric columns map to `Option<f64>`: an empty
//! field or a column missing from the header both load as `None`, so
//! the engine never branches on column absence — except for the two
//! KPIs that genuinely distinguish "column absent" from "value absent",
//! which read the presence flags carried on the table wrappers.
//!
//! Expected columns:
//!   placements: item_id, recommended_location, allocated_volume,
//!               allocated_weight, remaining_size, remaining_weight
//!   layout:     location_id, x_coord, y_coord, max_size, max_weight
//!   inventory:  item_id, demand_frequency

use std::io::Read;

use serde::Deserialize;

use crate::error::MetricsResult;

/// The sentinel the upstream placer writes when it could not place an item.
pub const UNPLACED: &str = "UNPLACED";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// One item-to-location assignment candidate, in file order.
///
/// File order is semantic: later rows are more recent observations for
/// the latest-residual-per-location reduction.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementRow {
    pub item_id: String,
    /// `None` when the field is empty; may hold the literal [`UNPLACED`]
    /// sentinel. The two "not placed" encodings are distinct upstream and
    /// are kept distinct here.
    pub recommended_location: Option<String>,
    pub allocated_volume: Option<f64>,
    pub allocated_weight: Option<f64>,
    pub remaining_size: Option<f64>,
    pub remaining_weight: Option<f64>,
}

/// One storage location. Static reference data, unique by `location_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutRow {
    pub location_id: String,
    pub x_coord: Option<f64>,
    pub y_coord: Option<f64>,
    pub max_size: Option<f64>,
    pub max_weight: Option<f64>,
}

/// One item master record; only the demand frequency is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryRow {
    pub item_id: String,
    pub demand_frequency: Option<f64>,
}

// ---------------------------------------------------------------------------
// Table wrappers
// ---------------------------------------------------------------------------

/// Placement rows plus header-presence flags.
#[derive(Debug, Clone)]
pub struct PlacementsTable {
    pub rows: Vec<PlacementRow>,
    /// Whether the source header carried a `remaining_size` column at all.
    /// `free_effective_capacity_ratio` is undefined without it.
    pub has_remaining_size: bool,
}

/// Layout rows plus header-presence flags.
#[derive(Debug, Clone)]
pub struct LayoutTable {
    pub rows: Vec<LayoutRow>,
    /// Both coordinate columns present; distance is undefined without them.
    pub has_coords: bool,
    /// `max_size` column present; total capacity is undefined without it.
    pub has_max_size: bool,
}

/// Inventory rows plus header-presence flags.
#[derive(Debug, Clone)]
pub struct InventoryTable {
    pub rows: Vec<InventoryRow>,
    /// `demand_frequency` column present; `weighted_distance` is only
    /// computed when it is.
    pub has_demand_frequency: bool,
}

/// Outcome of loading the optional inventory input.
///
/// `Unreadable` is a value, not an error: a corrupt optional input drops
/// the demand-weighted KPI and nothing else.
#[derive(Debug, Clone)]
pub enum InventorySource {
    Absent,
    Unreadable,
    Present(InventoryTable),
}

impl InventorySource {
    pub fn table(&self) -> Option<&InventoryTable> {
        match self {
            InventorySource::Present(t) => Some(t),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn has_column(headers: &csv::StringRecord, name: &str) -> bool {
    headers.iter().any(|h| h == name)
}

impl PlacementsTable {
    /// Load placement rows from a CSV reader.
    pub fn from_reader<R: Read>(reader: R) -> MetricsResult<Self> {
        let mut rdr = csv_reader(reader);
        let has_remaining_size = has_column(rdr.headers()?, "remaining_size");
        let mut rows = Vec::new();
        for result in rdr.deserialize() {
            rows.push(result?);
        }
        Ok(Self {
            rows,
            has_remaining_size,
        })
    }
}

impl LayoutTable {
    /// Load layout rows from a CSV reader.
    pub fn from_reader<R: Read>(reader: R) -> MetricsResult<Self> {
        let mut rdr = csv_reader(reader);
        let headers = rdr.headers()?;
        let has_coords = has_column(headers, "x_coord") && has_column(headers, "y_coord");
        let has_max_size = has_column(headers, "max_size");
        let mut rows = Vec::new();
        for result in rdr.deserialize() {
            rows.push(result?);
        }
        Ok(Self {
            rows,
            has_coords,
            has_max_size,
        })
    }
}

impl InventoryTable {
    /// Load inventory rows from a CSV reader.
    pub fn from_reader<R: Read>(reader: R) -> MetricsResult<Self> {
        let mut rdr = csv_reader(reader);
        let has_demand_frequency = has_column(rdr.headers()?, "demand_frequency");
        let mut rows = Vec::new();
        for result in rdr.deserialize() {
            rows.push(result?);
        }
        Ok(Self {
            rows,
            has_demand_frequency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PLACEMENTS: &str = "\
item_id,recommended_location,allocated_volume,allocated_weight,remaining_size,remaining_weight
ITM-001,A1,5.0,2.5,5.0,7.5
ITM-002,UNPLACED,,,,
ITM-003,,1.0,0.5,,
";

    const SAMPLE_LAYOUT: &str = "\
location_id,x_coord,y_coord,max_size,max_weight
A1,3,4,10,100
B2,,6,20,100
";

    #[test]
    fn placements_parse_with_empty_fields() {
        let table = PlacementsTable::from_reader(SAMPLE_PLACEMENTS.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert!(table.has_remaining_size);

        assert_eq!(table.rows[0].recommended_location.as_deref(), Some("A1"));
        assert_eq!(table.rows[0].allocated_volume, Some(5.0));

        assert_eq!(
            table.rows[1].recommended_location.as_deref(),
            Some(UNPLACED)
        );
        assert_eq!(table.rows[1].allocated_volume, None);

        // Empty location is None, distinct from the UNPLACED sentinel.
        assert_eq!(table.rows[2].recommended_location, None);
    }

    #[test]
    fn placements_missing_optional_columns_default_to_none() {
        let csv = "item_id,recommended_location\nITM-001,A1\n";
        let table = PlacementsTable::from_reader(csv.as_bytes()).unwrap();
        assert!(!table.has_remaining_size);
        assert_eq!(table.rows[0].allocated_volume, None);
        assert_eq!(table.rows[0].remaining_size, None);
    }

    #[test]
    fn layout_parse_and_flags() {
        let table = LayoutTable::from_reader(SAMPLE_LAYOUT.as_bytes()).unwrap();
        assert!(table.has_coords);
        assert!(table.has_max_size);
        assert_eq!(table.rows[0].x_coord, Some(3.0));
        assert_eq!(table.rows[1].x_coord, None);
    }

    #[test]
    fn layout_without_coordinate_columns() {
        let csv = "location_id,max_size\nA1,10\n";
        let table = LayoutTable::from_reader(csv.as_bytes()).unwrap();
        assert!(!table.has_coords);
        assert!(table.has_max_size);
    }

    #[test]
    fn layout_one_coordinate_column_is_not_enough() {
        let csv = "location_id,x_coord,max_size\nA1,3,10\n";
        let table = LayoutTable::from_reader(csv.as_bytes()).unwrap();
        assert!(!table.has_coords);
    }

    #[test]
    fn inventory_parse() {
        let csv = "item_id,demand_frequency\nITM-001,12\nITM-002,\n";
        let table = InventoryTable::from_reader(csv.as_bytes()).unwrap();
        assert!(table.has_demand_frequency);
        assert_eq!(table.rows[0].demand_frequency, Some(12.0));
        assert_eq!(table.rows[1].demand_frequency, None);
    }

    #[test]
    fn ragged_row_is_a_parse_error() {
        let csv = "item_id,recommended_location\nITM-001,A1,EXTRA,FIELDS\n";
        assert!(PlacementsTable::from_reader(csv.as_bytes()).is_err());
    }
}
