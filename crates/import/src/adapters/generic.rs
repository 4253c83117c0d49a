use super::{ColumnCandidates, ColumnMap, DistanceUnit, PlatformAdapter};
use crate::detect::Platform;

const COLUMNS: ColumnCandidates = ColumnCandidates {
    date: &["date", "trip date", "transaction date", "day", "start date", "time"],
    distance: &["distance", "km", "kilometers", "kilometres", "mileage", "miles"],
    amount: &["amount", "earnings", "total", "fare", "payment", "price", "cost"],
    vendor: &["vendor", "merchant", "platform", "company", "payee"],
    destination: &["destination", "dropoff", "drop off", "end location", "location", "address", "to"],
    purpose: &["purpose", "reason", "description", "memo"],
    notes: &["notes", "note", "comment", "comments"],
    category: &["category", "expense type"],
    start_odometer: &["start odometer", "odometer start", "odometer (start)", "start reading"],
    end_odometer: &["end odometer", "odometer end", "odometer (end)", "end reading"],
};

/// Any other export: each field is located by name, and distances are read
/// as kilometres unless the header mentions miles. Without a distance column
/// the distance comes from the start and end odometer readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericAdapter;

impl PlatformAdapter for GenericAdapter {
    fn platform(&self) -> Platform {
        Platform::Generic
    }

    fn source(&self) -> &'static str {
        "csv-import"
    }

    fn display_name(&self) -> Option<&'static str> {
        None
    }

    fn default_purpose(&self) -> &'static str {
        "Business trip"
    }

    fn columns(&self, headers: &[String]) -> ColumnMap {
        COLUMNS.resolve(headers, DistanceUnit::Km)
    }
}
