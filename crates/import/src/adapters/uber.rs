use super::{ColumnCandidates, ColumnMap, DistanceUnit, PlatformAdapter};
use crate::detect::Platform;

const COLUMNS: ColumnCandidates = ColumnCandidates {
    date: &["begin trip time", "request time", "date/time", "trip date", "date"],
    distance: &["trip distance", "distance (mi)", "distance (km)", "distance"],
    amount: &["driver payment", "total earnings", "your earnings", "gross fare", "earnings", "fare", "total"],
    vendor: &[],
    destination: &["dropoff address", "drop off address", "destination", "dropoff location"],
    purpose: &[],
    notes: &["product type", "vehicle type", "service type"],
    category: &[],
    start_odometer: &[],
    end_odometer: &[],
};

/// Uber driver trip exports. Distances are in miles unless the header says km.
#[derive(Debug, Clone, Copy, Default)]
pub struct UberAdapter;

impl PlatformAdapter for UberAdapter {
    fn platform(&self) -> Platform {
        Platform::Uber
    }

    fn source(&self) -> &'static str {
        "uber-csv"
    }

    fn display_name(&self) -> Option<&'static str> {
        Some("Uber")
    }

    fn default_purpose(&self) -> &'static str {
        "Uber trip"
    }

    fn columns(&self, headers: &[String]) -> ColumnMap {
        COLUMNS.resolve(headers, DistanceUnit::Miles)
    }
}
