//! Input-file resolution and the three-table load contract.
//!
//! Placements and layout are required; the layout file is either an
//! explicit override or the first match from an ordered candidate list.
//! Inventory is optional and soft-fails: absent or unparsable inventory
//! never aborts a run, it only drops the demand-weighted KPI.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{MetricsError, MetricsResult};
use crate::tables::{InventorySource, InventoryTable, LayoutTable, PlacementsTable};

pub const PLACEMENTS_FILE: &str = "placement_recommendations.csv";
pub const LAYOUT_CANDIDATE_FILENAMES: [&str; 3] = [
    "locations_data_extended.csv",
    "warehouse_layout.csv",
    "locations_data.csv",
];
pub const INVENTORY_FILE: &str = "inventory_data.csv";

/// Where to look for the input tables.
#[derive(Debug, Clone)]
pub struct InputPaths {
    /// Directory holding the fixed-name input files.
    pub data_dir: PathBuf,
    /// Explicit layout file; skips candidate probing when set.
    pub layout_override: Option<PathBuf>,
}

impl InputPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            layout_override: None,
        }
    }

    pub fn with_layout_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.layout_override = Some(path.into());
        self
    }

    fn placements_path(&self) -> PathBuf {
        self.data_dir.join(PLACEMENTS_FILE)
    }

    fn inventory_path(&self) -> PathBuf {
        self.data_dir.join(INVENTORY_FILE)
    }

    /// Pick the layout file: an override must exist as given; otherwise the
    /// first existing candidate wins, in fixed order.
    fn resolve_layout(&self) -> MetricsResult<PathBuf> {
        if let Some(ref path) = self.layout_override {
            if !path.exists() {
                return Err(MetricsError::MissingInput {
                    what: "layout",
                    path: path.clone(),
                });
            }
            return Ok(path.clone());
        }
        for name in LAYOUT_CANDIDATE_FILENAMES {
            let candidate = self.data_dir.join(name);
            if candidate.exists() {
                return Ok(candidate);
            }
        }
        Err(MetricsError::MissingInput {
            what: "layout",
            path: self.data_dir.join(LAYOUT_CANDIDATE_FILENAMES[0]),
        })
    }
}

fn open_required(what: &'static str, path: &Path) -> MetricsResult<File> {
    if !path.exists() {
        return Err(MetricsError::MissingInput {
            what,
            path: path.to_path_buf(),
        });
    }
    Ok(File::open(path)?)
}

/// Load inventory best-effort. Absent and unreadable are outcomes, not errors.
fn load_inventory(path: &Path) -> InventorySource {
    if !path.exists() {
        return InventorySource::Absent;
    }
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            log::warn!("inventory file {} unreadable: {}", path.display(), e);
            return InventorySource::Unreadable;
        }
    };
    match InventoryTable::from_reader(file) {
        Ok(table) => InventorySource::Present(table),
        Err(e) => {
            log::warn!(
                "inventory file {} failed to parse, continuing without it: {}",
                path.display(),
                e
            );
            InventorySource::Unreadable
        }
    }
}

/// Load the three input tables.
///
/// Placements and layout failures are fatal; inventory is best-effort.
pub fn load_tables(
    paths: &InputPaths,
) -> MetricsResult<(PlacementsTable, LayoutTable, InventorySource)> {
    let placements_path = paths.placements_path();
    let placements = PlacementsTable::from_reader(open_required("placements", &placements_path)?)?;

    let layout_path = paths.resolve_layout()?;
    let layout = LayoutTable::from_reader(open_required("layout", &layout_path)?)?;

    let inventory = load_inventory(&paths.inventory_path());

    Ok((placements, layout, inventory))
}
