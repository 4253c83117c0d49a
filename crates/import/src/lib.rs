//! CSV import of rideshare earnings and mileage exports.
//!
//! [`import_csv`] tokenizes the text, detects the platform from the header
//! row and hands the rows to the matching [`PlatformAdapter`].

pub mod adapters;
pub mod csv;
pub mod date;
pub mod detect;
pub mod util;

pub use adapters::{
    adapter_for, AdapterOptions, ConvertedRow, GenericAdapter, ImportBatch, ImportError,
    ImportSummary, LyftAdapter, PlatformAdapter, RowError, SkippedRow, UberAdapter,
};
pub use csv::{ParsedCsv, RawRow};
pub use detect::{detect, Platform};

use trajet_core::Clock;

/// Import a CSV export, detecting its platform from the headers.
pub fn import_csv(text: &str, options: &AdapterOptions, clock: &dyn Clock) -> ImportBatch {
    import_with(text, None, options, clock)
}

/// Import a CSV export as `platform`, skipping detection.
pub fn import_csv_as(
    platform: Platform,
    text: &str,
    options: &AdapterOptions,
    clock: &dyn Clock,
) -> ImportBatch {
    import_with(text, Some(platform), options, clock)
}

fn import_with(
    text: &str,
    forced: Option<Platform>,
    options: &AdapterOptions,
    clock: &dyn Clock,
) -> ImportBatch {
    let fallback = forced.unwrap_or(Platform::Generic);
    if text.trim().is_empty() {
        tracing::warn!("csv import called with empty input");
        return ImportBatch::empty(fallback, ImportError::EmptyInput);
    }

    let parsed = csv::parse(text);
    let platform = forced.unwrap_or_else(|| detect(&parsed.headers));
    if parsed.rows.is_empty() {
        tracing::warn!(%platform, "csv has a header row but no data rows");
        return ImportBatch::empty(platform, ImportError::NoDataRows);
    }

    tracing::debug!(%platform, forced = forced.is_some(), rows = parsed.rows.len(), "importing csv");
    adapter_for(platform).adapt(&parsed, options, clock)
}
