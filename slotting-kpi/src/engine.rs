//! The KPI computation.
//!
//! Joins placement rows to layout rows, aggregates shelf-level
//! utilization, and derives the full KPI vector for one snapshot.
//! Every ratio and mean follows the same undefined-value policy:
//! empty group, missing column or non-positive denominator yields
//! `None`, and mean aggregation ignores undefined inputs rather than
//! treating them as zero.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::snapshot::KpiSnapshot;
use crate::tables::{InventorySource, LayoutTable, PlacementRow, PlacementsTable, UNPLACED};

/// A placement row with its layout join results.
struct Joined<'a> {
    row: &'a PlacementRow,
    distance: Option<f64>,
    max_size: Option<f64>,
}

/// Per-location shelf aggregate: summed allocated volume and the
/// first-seen capacity.
struct ShelfAggregate {
    volume: f64,
    max_size: Option<f64>,
}

impl ShelfAggregate {
    /// Undefined when capacity is zero or absent.
    fn utilization(&self) -> Option<f64> {
        self.max_size.filter(|c| *c != 0.0).map(|c| self.volume / c)
    }
}

/// Mean over the defined values only; `None` when nothing is defined.
fn mean_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut count = 0u64;
    for v in values.into_iter().flatten() {
        sum += v;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// A row is placed iff its location is present AND not the sentinel.
/// Both checks stay explicit: a null location and the literal UNPLACED
/// are distinct encodings upstream.
fn is_placed(row: &PlacementRow) -> bool {
    match row.recommended_location.as_deref() {
        Some(loc) => loc != UNPLACED,
        None => false,
    }
}

/// Compute one KPI snapshot at the given capture instant.
pub fn compute_kpis(
    placements: &PlacementsTable,
    layout: &LayoutTable,
    inventory: &InventorySource,
    captured_at: DateTime<Utc>,
) -> KpiSnapshot {
    // Per-location distance from origin, only when both coordinate
    // columns exist. First layout row wins on a duplicate location id.
    let mut layout_by_location: HashMap<&str, (Option<f64>, Option<f64>)> = HashMap::new();
    for row in &layout.rows {
        let distance = if layout.has_coords {
            row.x_coord.zip(row.y_coord).map(|(x, y)| (x * x + y * y).sqrt())
        } else {
            None
        };
        layout_by_location
            .entry(row.location_id.as_str())
            .or_insert((distance, row.max_size));
    }

    // Left join: rows without a layout match keep undefined
    // distance/capacity.
    let joined: Vec<Joined<'_>> = placements
        .rows
        .iter()
        .map(|row| {
            let hit = row
                .recommended_location
                .as_deref()
                .and_then(|loc| layout_by_location.get(loc));
            Joined {
                row,
                distance: hit.and_then(|(d, _)| *d),
                max_size: hit.and_then(|(_, m)| *m),
            }
        })
        .collect();

    let placed: Vec<&Joined<'_>> = joined.iter().filter(|j| is_placed(j.row)).collect();

    let avg_distance = mean_defined(placed.iter().map(|j| j.distance));

    let unplaced_rate = (!joined.is_empty()).then(|| {
        let unplaced = joined
            .iter()
            .filter(|j| j.row.recommended_location.as_deref() == Some(UNPLACED))
            .count();
        unplaced as f64 / joined.len() as f64
    });

    // Shelf aggregation over placed rows that carry an allocated volume.
    let mut shelves: BTreeMap<&str, ShelfAggregate> = BTreeMap::new();
    let mut total_allocated_volume = 0.0;
    for j in &placed {
        let Some(volume) = j.row.allocated_volume else {
            continue;
        };
        total_allocated_volume += volume;
        // is_placed guarantees the location is present here.
        if let Some(loc) = j.row.recommended_location.as_deref() {
            shelves
                .entry(loc)
                .and_modify(|agg| agg.volume += volume)
                .or_insert(ShelfAggregate {
                    volume,
                    max_size: j.max_size,
                });
        }
    }

    let avg_cube_utilization = mean_defined(shelves.values().map(|agg| agg.utilization()));
    let fragmentation_rate = (!shelves.is_empty()).then(|| {
        let fragmented = shelves
            .values()
            .filter_map(|agg| agg.utilization())
            .filter(|u| *u > 0.0 && *u < 0.1)
            .count();
        fragmented as f64 / shelves.len() as f64
    });

    let total_capacity = layout
        .has_max_size
        .then(|| layout.rows.iter().filter_map(|r| r.max_size).sum::<f64>());

    let capacity_ratio = total_capacity
        .filter(|c| *c > 0.0)
        .map(|c| total_allocated_volume / c);

    let free_effective_capacity_ratio =
        free_effective_ratio(placements, total_capacity);

    let placements_with_capacity_cols_ratio = (!placements.rows.is_empty()).then(|| {
        let defined = placements
            .rows
            .iter()
            .filter(|r| r.allocated_volume.is_some())
            .count();
        defined as f64 / placements.rows.len() as f64
    });

    let weighted_distance = weighted_distance(&placed, inventory);

    KpiSnapshot {
        timestamp: captured_at.to_rfc3339(),
        rows: placements.rows.len() as u64,
        placed_rows: placed.len() as u64,
        avg_distance,
        weighted_distance,
        unplaced_rate,
        avg_cube_utilization,
        fragmentation_rate,
        total_allocated_volume,
        capacity_ratio,
        free_effective_capacity_ratio,
        placements_with_capacity_cols_ratio,
    }
}

/// Compute one KPI snapshot stamped with the current time.
pub fn compute_kpis_now(
    placements: &PlacementsTable,
    layout: &LayoutTable,
    inventory: &InventorySource,
) -> KpiSnapshot {
    compute_kpis(placements, layout, inventory, Utc::now())
}

/// Approximate currently-free capacity from the most recent residual
/// observation per location.
///
/// The placements input is an append-only log of placement events, not a
/// live capacity ledger, so the latest state per key is derived by
/// overwriting on newer: rows arrive in file order and a later
/// remaining-size observation for a location replaces the earlier one.
/// Rows without a location cannot be keyed and are skipped; the literal
/// UNPLACED sentinel is a valid key.
fn free_effective_ratio(
    placements: &PlacementsTable,
    total_capacity: Option<f64>,
) -> Option<f64> {
    if !placements.has_remaining_size {
        return None;
    }
    let mut latest: HashMap<&str, f64> = HashMap::new();
    for row in &placements.rows {
        if let (Some(loc), Some(remaining)) =
            (row.recommended_location.as_deref(), row.remaining_size)
        {
            latest.insert(loc, remaining);
        }
    }
    if latest.is_empty() {
        return None;
    }
    let capacity = total_capacity.filter(|c| *c > 0.0)?;
    Some(latest.values().sum::<f64>() / capacity)
}

/// Demand-weighted mean distance over the placed subset.
///
/// Requires a present inventory table with a demand-frequency column.
/// Only rows where both the distance and the demand are defined enter
/// the sums, so a layout without coordinates leaves this undefined.
fn weighted_distance(placed: &[&Joined<'_>], inventory: &InventorySource) -> Option<f64> {
    let table = inventory.table().filter(|t| t.has_demand_frequency)?;

    // First occurrence wins on a duplicate item id.
    let mut demand_by_item: HashMap<&str, f64> = HashMap::new();
    for row in &table.rows {
        if let Some(demand) = row.demand_frequency {
            demand_by_item.entry(row.item_id.as_str()).or_insert(demand);
        }
    }

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for j in placed {
        if let (Some(distance), Some(demand)) = (
            j.distance,
            demand_by_item.get(j.row.item_id.as_str()).copied(),
        ) {
            numerator += distance * demand;
            denominator += demand;
        }
    }
    (denominator > 0.0).then(|| numerator / denominator)
}
