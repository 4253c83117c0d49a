use super::{ColumnCandidates, ColumnMap, DistanceUnit, PlatformAdapter};
use crate::detect::Platform;

const COLUMNS: ColumnCandidates = ColumnCandidates {
    date: &["ride date", "date", "requested at", "start time", "pickup time"],
    distance: &["ride distance", "distance (miles)", "distance (km)", "distance"],
    amount: &["ride earnings", "driver earnings", "total earnings", "earnings", "total"],
    vendor: &[],
    destination: &["dropoff address", "dropoff location", "destination"],
    purpose: &[],
    notes: &["ride type"],
    category: &[],
    start_odometer: &[],
    end_odometer: &[],
};

/// Lyft driver ride exports. Distances are in miles unless the header says km.
#[derive(Debug, Clone, Copy, Default)]
pub struct LyftAdapter;

impl PlatformAdapter for LyftAdapter {
    fn platform(&self) -> Platform {
        Platform::Lyft
    }

    fn source(&self) -> &'static str {
        "lyft-csv"
    }

    fn display_name(&self) -> Option<&'static str> {
        Some("Lyft")
    }

    fn default_purpose(&self) -> &'static str {
        "Lyft ride"
    }

    fn columns(&self, headers: &[String]) -> ColumnMap {
        COLUMNS.resolve(headers, DistanceUnit::Miles)
    }
}
