//! Platform adapters: map tokenized CSV rows onto canonical trips and receipts.
//!
//! Every adapter resolves its columns once from the header row and then runs
//! the same per-row conversion. A row that fails yields a [`RowError`] and is
//! recorded in the [`ImportSummary`] instead of aborting the import.

pub mod generic;
pub mod lyft;
pub mod uber;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use trajet_core::{
    hash::record_id, CategoryKey, CategoryRegistry, Clock, Expense, ExpenseReceipt, Kilometres,
    Money, RetentionPolicy, Trip, TripKind, ValidationError,
};

use crate::csv::{ParsedCsv, RawRow};
use crate::date;
use crate::detect::Platform;
use crate::util::{header_is_miles, normalize_header, parse_distance, parse_money, resolve_column};

pub use generic::GenericAdapter;
pub use lyft::LyftAdapter;
pub use uber::UberAdapter;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Row has neither distance nor earnings")]
    NoActivity,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ImportError {
    #[error("Input is empty")]
    EmptyInput,
    #[error("No data rows after the header")]
    NoDataRows,
}

/// Knobs shared by all adapters.
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    pub retention: RetentionPolicy,
    /// Category given to earnings receipts from platforms that have no
    /// category column.
    pub earnings_category: CategoryKey,
    pub categories: CategoryRegistry,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        AdapterOptions {
            retention: RetentionPolicy::default(),
            earnings_category: CategoryKey::other(),
            categories: CategoryRegistry::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Km,
    Miles,
}

/// Headers resolved for each semantic field, plus the defaults an adapter
/// fills in when a column is absent.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    pub date: Option<String>,
    pub distance: Option<String>,
    pub distance_unit: Option<DistanceUnit>,
    pub amount: Option<String>,
    pub vendor: Option<String>,
    pub destination: Option<String>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub start_odometer: Option<String>,
    pub end_odometer: Option<String>,
}

/// Candidate header names for one platform layout, most specific first.
#[derive(Debug, Clone, Copy)]
pub struct ColumnCandidates {
    pub date: &'static [&'static str],
    pub distance: &'static [&'static str],
    pub amount: &'static [&'static str],
    pub vendor: &'static [&'static str],
    pub destination: &'static [&'static str],
    pub purpose: &'static [&'static str],
    pub notes: &'static [&'static str],
    pub category: &'static [&'static str],
    pub start_odometer: &'static [&'static str],
    pub end_odometer: &'static [&'static str],
}

impl ColumnCandidates {
    /// Resolve every field against `headers`. `default_unit` applies when the
    /// distance header carries no unit hint.
    pub fn resolve(&self, headers: &[String], default_unit: DistanceUnit) -> ColumnMap {
        let find = |candidates: &[&str]| resolve_column(headers, candidates).map(str::to_string);
        let distance = find(self.distance);
        let distance_unit = distance.as_deref().map(|h| {
            let normalized = normalize_header(h);
            if header_is_miles(h) {
                DistanceUnit::Miles
            } else if normalized.contains("km") || normalized.contains("kilomet") {
                DistanceUnit::Km
            } else {
                default_unit
            }
        });
        ColumnMap {
            date: find(self.date),
            distance,
            distance_unit,
            amount: find(self.amount),
            vendor: find(self.vendor),
            destination: find(self.destination),
            purpose: find(self.purpose),
            notes: find(self.notes),
            category: find(self.category),
            start_odometer: find(self.start_odometer),
            end_odometer: find(self.end_odometer),
        }
    }
}

/// What distinguishes one platform's export from another.
pub trait PlatformAdapter {
    fn platform(&self) -> Platform;

    /// Tag written to `source` on every record, e.g. `uber-csv`.
    fn source(&self) -> &'static str;

    /// Display name used as vendor/client when the export has none.
    fn display_name(&self) -> Option<&'static str>;

    /// Purpose written on trips when no purpose column is present.
    fn default_purpose(&self) -> &'static str;

    fn columns(&self, headers: &[String]) -> ColumnMap;

    /// Convert all rows of `csv`.
    fn adapt(&self, csv: &ParsedCsv, options: &AdapterOptions, clock: &dyn Clock) -> ImportBatch {
        let columns = self.columns(&csv.headers);
        let mut batch = ImportBatch::new(self.platform(), csv.rows.len());

        if columns.date.is_none() {
            tracing::warn!(platform = %self.platform(), "no date column found; every row will be skipped");
        }

        for row in &csv.rows {
            match convert_row(self, &columns, row, options, clock).and_then(|c| batch.push(c)) {
                Ok(()) => {}
                Err(reason) => {
                    tracing::debug!(row = row.number, %reason, "skipping row");
                    batch.skip(row, reason);
                }
            }
        }

        tracing::info!(
            platform = %self.platform(),
            total = batch.summary.total_rows,
            imported = batch.summary.imported_rows,
            skipped = batch.summary.skipped.len(),
            "csv import finished"
        );
        batch
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub platform: Platform,
    pub total_rows: usize,
    pub imported_rows: usize,
    pub skipped: Vec<SkippedRow>,
    pub trip_count: usize,
    pub receipt_count: usize,
    pub total_km: Decimal,
    pub total_earnings: Money,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Result of one import call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportBatch {
    pub trips: Vec<Trip>,
    pub receipts: Vec<ExpenseReceipt>,
    pub summary: ImportSummary,
    /// Set when the input produced nothing to adapt at all.
    pub error: Option<ImportError>,
}

/// Records produced from a single row.
#[derive(Debug, Clone)]
pub struct ConvertedRow {
    pub date: NaiveDate,
    pub trip: Option<Trip>,
    pub receipt: Option<ExpenseReceipt>,
}

impl ImportBatch {
    pub fn new(platform: Platform, total_rows: usize) -> Self {
        ImportBatch {
            trips: Vec::new(),
            receipts: Vec::new(),
            summary: ImportSummary {
                platform,
                total_rows,
                imported_rows: 0,
                skipped: Vec::new(),
                trip_count: 0,
                receipt_count: 0,
                total_km: Decimal::ZERO,
                total_earnings: Money::zero(),
                first_date: None,
                last_date: None,
            },
            error: None,
        }
    }

    pub fn empty(platform: Platform, error: ImportError) -> Self {
        ImportBatch { error: Some(error), ..ImportBatch::new(platform, 0) }
    }

    /// Adds a converted row. A row that would push the running totals past
    /// what a decimal can hold is refused and left for the caller to skip.
    fn push(&mut self, converted: ConvertedRow) -> Result<(), RowError> {
        let s = &mut self.summary;
        let total_km = match &converted.trip {
            Some(trip) => s.total_km.checked_add(trip.distance.value()),
            None => Some(s.total_km),
        };
        let total_earnings = match &converted.receipt {
            Some(receipt) => s.total_earnings.checked_add(receipt.amount()),
            None => Some(s.total_earnings),
        };
        let (Some(total_km), Some(total_earnings)) = (total_km, total_earnings) else {
            return Err(ValidationError::OutOfRange("import totals".to_string()).into());
        };

        s.imported_rows += 1;
        s.total_km = total_km;
        s.total_earnings = total_earnings;
        s.first_date = Some(s.first_date.map_or(converted.date, |d| d.min(converted.date)));
        s.last_date = Some(s.last_date.map_or(converted.date, |d| d.max(converted.date)));
        if let Some(trip) = converted.trip {
            s.trip_count += 1;
            self.trips.push(trip);
        }
        if let Some(receipt) = converted.receipt {
            s.receipt_count += 1;
            self.receipts.push(receipt);
        }
        Ok(())
    }

    fn skip(&mut self, row: &RawRow, reason: RowError) {
        self.summary.skipped.push(SkippedRow {
            row: row.number,
            reason: reason.to_string(),
        });
    }
}

/// The per-row algorithm shared by every adapter.
pub fn convert_row<A: PlatformAdapter + ?Sized>(
    adapter: &A,
    columns: &ColumnMap,
    row: &RawRow,
    options: &AdapterOptions,
    clock: &dyn Clock,
) -> Result<ConvertedRow, RowError> {
    let raw_date = row
        .value(columns.date.as_deref())
        .ok_or(ValidationError::MissingField("date"))?;
    let date = date::normalize(raw_date)
        .ok_or_else(|| RowError::Parse(format!("unrecognized date '{raw_date}'")))?;

    let start_odometer = odometer(row, columns.start_odometer.as_deref())?;
    let end_odometer = odometer(row, columns.end_odometer.as_deref())?;
    let from_odometer = match (start_odometer, end_odometer) {
        (Some(start), Some(end)) => Some(Trip::odometer_distance(start, end)?),
        _ => None,
    };

    let distance = match row.value(columns.distance.as_deref()) {
        Some(raw) => {
            let value = parse_distance(raw)
                .ok_or_else(|| RowError::Parse(format!("invalid distance '{raw}'")))?;
            if value.is_sign_negative() && !value.is_zero() {
                return Err(ValidationError::NegativeDistance(raw.to_string()).into());
            }
            let km = match columns.distance_unit.unwrap_or(DistanceUnit::Km) {
                DistanceUnit::Miles => Kilometres::from_miles(value),
                DistanceUnit::Km => Kilometres::new(value),
            };
            km.ok_or_else(|| ValidationError::OutOfRange(raw.to_string()))?
        }
        None => from_odometer.unwrap_or_else(Kilometres::zero),
    };

    let amount = match row.value(columns.amount.as_deref()) {
        Some(raw) => {
            let value =
                parse_money(raw).ok_or_else(|| RowError::Parse(format!("invalid amount '{raw}'")))?;
            let money = Money::from_decimal(value);
            if money.is_negative() {
                return Err(ValidationError::NegativeAmount(money).into());
            }
            money
        }
        None => Money::zero(),
    };

    if distance.is_zero() && amount.is_zero() {
        return Err(RowError::NoActivity);
    }

    let now = clock.now();
    let row_no = row.number.to_string();
    let id_for = |kind: &str| {
        let mut parts = vec![adapter.source(), kind, row_no.as_str()];
        parts.extend(row.iter().map(|(_, v)| v));
        record_id(&parts)
    };
    let text = |col: &Option<String>| row.value(col.as_deref()).map(str::to_string);
    let display = adapter.display_name();

    let trip = (!distance.is_zero()).then(|| Trip {
        id: id_for("trip"),
        date,
        destination: text(&columns.destination).unwrap_or_default(),
        purpose: text(&columns.purpose).unwrap_or_else(|| adapter.default_purpose().to_string()),
        start_odometer,
        end_odometer,
        distance,
        kind: TripKind::Business,
        client_name: display.map(str::to_string),
        notes: text(&columns.notes),
        source: adapter.source().to_string(),
        created_at: now,
    });

    let receipt = if amount.is_zero() {
        None
    } else {
        let vendor = text(&columns.vendor)
            .or_else(|| display.map(str::to_string))
            .unwrap_or_else(|| "Unknown".to_string());
        let category = match text(&columns.category) {
            Some(raw) => options.categories.resolve(&raw),
            None => options.earnings_category.clone(),
        };
        let description = text(&columns.purpose)
            .unwrap_or_else(|| format!("{vendor} earnings {date}"));
        let expense = Expense { date, amount, vendor, category, description };
        Some(ExpenseReceipt::new(id_for("receipt"), expense, adapter.source(), now, options.retention)?)
    };

    Ok(ConvertedRow { date, trip, receipt })
}

/// Odometer readings are taken as kilometres.
fn odometer(row: &RawRow, header: Option<&str>) -> Result<Option<Decimal>, RowError> {
    row.value(header)
        .map(|raw| parse_distance(raw).ok_or_else(|| RowError::Parse(format!("invalid odometer '{raw}'"))))
        .transpose()
}

/// Adapter for a detected or forced platform.
pub fn adapter_for(platform: Platform) -> Box<dyn PlatformAdapter> {
    match platform {
        Platform::Uber => Box::new(UberAdapter),
        Platform::Lyft => Box::new(LyftAdapter),
        Platform::Generic => Box::new(GenericAdapter),
    }
}
