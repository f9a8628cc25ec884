//! Reporting driver: load the slotting tables, compute one KPI
//! snapshot, append it to the metrics history, print a summary.
//!
//! All computation lives in `slotting-kpi`; this binary is argument
//! parsing, orchestration and rendering only.

use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use slotting_kpi::loader::{load_tables, InputPaths};
use slotting_kpi::{append_snapshot, compute_kpis_now};

const HISTORY_FILE: &str = "metrics_history.csv";

fn print_usage() {
    eprintln!("Usage: slotting-report [--dir PATH] [--layout FILE] [--print-only] [--json]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dir         Directory holding the input CSVs (default: current directory)");
    eprintln!("  --layout      Explicit layout file, skips candidate probing");
    eprintln!("  --print-only  Compute and display KPIs without appending to the history");
    eprintln!("  --json        Output the snapshot as JSON instead of formatted text");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  slotting-report");
    eprintln!("  slotting-report --layout locations_data_extended.csv --print-only");
    eprintln!("  slotting-report --dir /srv/warehouse/exports --json");
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut data_dir = PathBuf::from(".");
    let mut layout_override: Option<PathBuf> = None;
    let mut print_only = false;
    let mut json_output = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" => {
                if i + 1 < args.len() {
                    data_dir = PathBuf::from(&args[i + 1]);
                    i += 2;
                } else {
                    eprintln!("Error: --dir requires a path");
                    process::exit(1);
                }
            }
            "--layout" => {
                if i + 1 < args.len() {
                    layout_override = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("Error: --layout requires a file path");
                    process::exit(1);
                }
            }
            "--print-only" => {
                print_only = true;
                i += 1;
            }
            "--json" => {
                json_output = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
    }

    let mut paths = InputPaths::new(data_dir.clone());
    if let Some(layout) = layout_override {
        paths = paths.with_layout_override(layout);
    }

    let load_start = Instant::now();
    let (placements, layout, inventory) = match load_tables(&paths) {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("Error loading input tables: {}", e);
            process::exit(1);
        }
    };
    let load_ms = load_start.elapsed().as_millis();

    let compute_start = Instant::now();
    let kpis = compute_kpis_now(&placements, &layout, &inventory);
    let compute_ms = compute_start.elapsed().as_millis();

    if !print_only {
        let history_path = data_dir.join(HISTORY_FILE);
        if let Err(e) = append_snapshot(&history_path, &kpis) {
            eprintln!("Error appending to {}: {}", history_path.display(), e);
            process::exit(1);
        }
    }

    if json_output {
        match serde_json::to_string_pretty(&kpis) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("KPI Summary:");
    for (key, value) in kpis.display_fields() {
        println!("  {}: {}", key, value);
    }
    println!();
    println!(
        "  Loaded in {}ms \u{00b7} Computed in {}ms{}",
        load_ms,
        compute_ms,
        if print_only { " \u{00b7} not appended (--print-only)" } else { "" }
    );
}
