//! End-to-end pipeline tests: CSV fixtures on disk, loader, engine,
//! history appender.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use tempfile::tempdir;

use slotting_kpi::loader::{InputPaths, INVENTORY_FILE, PLACEMENTS_FILE};
use slotting_kpi::{append_snapshot, compute_kpis, load_tables, read_history};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const PLACEMENTS_CSV: &str = "\
item_id,recommended_location,allocated_volume,allocated_weight,remaining_size,remaining_weight
ITM-001,A1,5.0,2.5,5.0,90.0
ITM-002,UNPLACED,,,,
ITM-003,B2,2.0,1.0,18.0,95.0
ITM-004,A1,1.0,0.5,4.0,88.0
";

const LAYOUT_CSV: &str = "\
location_id,x_coord,y_coord,max_size,max_weight
A1,3,4,10,100
B2,6,8,20,100
";

const INVENTORY_CSV: &str = "\
item_id,demand_frequency,current_stock
ITM-001,6,40
ITM-003,2,15
";

fn write_fixture(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn seed_inputs(dir: &Path) {
    write_fixture(dir, PLACEMENTS_FILE, PLACEMENTS_CSV);
    write_fixture(dir, "locations_data_extended.csv", LAYOUT_CSV);
    write_fixture(dir, INVENTORY_FILE, INVENTORY_CSV);
}

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, 5, 0, 0).unwrap()
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("metric should be defined");
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {expected}, got {actual}"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn full_pipeline_computes_and_appends() {
    let dir = tempdir().unwrap();
    seed_inputs(dir.path());

    let (placements, layout, inventory) = load_tables(&InputPaths::new(dir.path())).unwrap();
    let kpis = compute_kpis(&placements, &layout, &inventory, fixed_now());

    assert_eq!(kpis.rows, 4);
    assert_eq!(kpis.placed_rows, 3);
    // A1 distance 5 (twice), B2 distance 10.
    assert_eq!(kpis.avg_distance, Some(20.0 / 3.0));
    assert_eq!(kpis.unplaced_rate, Some(0.25));
    // A1: 6/10, B2: 2/20.
    assert_close(kpis.avg_cube_utilization, 0.35);
    // Only B2's 0.1 utilization is NOT fragmented (open interval).
    assert_eq!(kpis.fragmentation_rate, Some(0.0));
    assert_eq!(kpis.total_allocated_volume, 8.0);
    assert_eq!(kpis.capacity_ratio, Some(8.0 / 30.0));
    // Latest residuals: A1 -> 4.0 (second observation wins), B2 -> 18.0.
    assert_eq!(kpis.free_effective_capacity_ratio, Some(22.0 / 30.0));
    assert_eq!(kpis.placements_with_capacity_cols_ratio, Some(0.75));
    // (5*6 + 10*2) / 8
    assert_eq!(kpis.weighted_distance, Some(6.25));

    let history_path = dir.path().join("metrics_history.csv");
    append_snapshot(&history_path, &kpis).unwrap();
    append_snapshot(&history_path, &kpis).unwrap();

    let history = read_history(&history_path).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], kpis);
    assert_eq!(history[1], kpis);
}

#[test]
fn corrupt_inventory_drops_only_the_weighted_metric() {
    let dir = tempdir().unwrap();
    seed_inputs(dir.path());
    write_fixture(dir.path(), INVENTORY_FILE, "item_id,demand_frequency\nbad,row,extra,fields\n");

    let (placements, layout, inventory) = load_tables(&InputPaths::new(dir.path())).unwrap();
    let kpis = compute_kpis(&placements, &layout, &inventory, fixed_now());

    assert_eq!(kpis.weighted_distance, None);
    // Everything else is unaffected.
    assert_eq!(kpis.avg_distance, Some(20.0 / 3.0));
    assert_eq!(kpis.unplaced_rate, Some(0.25));
    assert_eq!(kpis.capacity_ratio, Some(8.0 / 30.0));
}

#[test]
fn layout_without_coordinates_keeps_capacity_metrics() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path(), PLACEMENTS_FILE, PLACEMENTS_CSV);
    write_fixture(
        dir.path(),
        "warehouse_layout.csv",
        "location_id,max_size,max_weight\nA1,10,100\nB2,20,100\n",
    );

    let (placements, layout, inventory) = load_tables(&InputPaths::new(dir.path())).unwrap();
    let kpis = compute_kpis(&placements, &layout, &inventory, fixed_now());

    assert_eq!(kpis.avg_distance, None);
    assert_eq!(kpis.weighted_distance, None);
    assert_eq!(kpis.unplaced_rate, Some(0.25));
    assert_eq!(kpis.capacity_ratio, Some(8.0 / 30.0));
    assert_close(kpis.avg_cube_utilization, 0.35);
}

#[test]
fn engine_is_deterministic_for_a_fixed_clock() {
    let dir = tempdir().unwrap();
    seed_inputs(dir.path());

    let (placements, layout, inventory) = load_tables(&InputPaths::new(dir.path())).unwrap();
    let first = compute_kpis(&placements, &layout, &inventory, fixed_now());
    let second = compute_kpis(&placements, &layout, &inventory, fixed_now());

    assert_eq!(first, second);
}
