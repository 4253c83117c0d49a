use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::distance::{round_tenths, Kilometres};
use crate::error::ValidationError;

/// Whether a trip counts toward the business-use share of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripKind {
    Business,
    Personal,
}

impl fmt::Display for TripKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripKind::Business => write!(f, "business"),
            TripKind::Personal => write!(f, "personal"),
        }
    }
}

impl std::str::FromStr for TripKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "business" => Ok(TripKind::Business),
            "personal" => Ok(TripKind::Personal),
            other => Err(format!("Unknown trip type: '{other}'")),
        }
    }
}

impl TripKind {
    pub fn from_flag(is_business: bool) -> Self {
        if is_business {
            TripKind::Business
        } else {
            TripKind::Personal
        }
    }

    /// Collapses the legacy boolean flag and `type` tag into one kind.
    ///
    /// When both are present and disagree the `type` tag wins, since that is
    /// what tax summaries were computed from, and the divergence is logged.
    pub fn reconcile(is_business: Option<bool>, type_tag: Option<&str>) -> Self {
        let tagged = type_tag.and_then(|t| t.parse::<TripKind>().ok());
        match (is_business.map(TripKind::from_flag), tagged) {
            (Some(flag), Some(tag)) if flag != tag => {
                tracing::warn!(
                    flag = %flag,
                    tag = %tag,
                    "trip business flag disagrees with type tag; using type tag"
                );
                tag
            }
            (_, Some(tag)) => tag,
            (Some(flag), None) => flag,
            (None, None) => TripKind::Personal,
        }
    }
}

/// Canonical trip record, independent of where it was imported from.
///
/// Deserializes through [`TripRecord`], so stored trips in the older shape
/// (camelCase names, an `isBusinessTrip` flag next to the `type` tag, a
/// distance only implied by odometer readings) are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TripRecord")]
pub struct Trip {
    pub id: String,
    pub date: NaiveDate,
    pub destination: String,
    pub purpose: String,
    pub start_odometer: Option<Decimal>,
    pub end_odometer: Option<Decimal>,
    pub distance: Kilometres,
    #[serde(rename = "type")]
    pub kind: TripKind,
    pub client_name: Option<String>,
    pub notes: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn is_business(&self) -> bool {
        self.kind == TripKind::Business
    }

    /// Distance implied by odometer readings, when both are present.
    pub fn odometer_distance(
        start: Decimal,
        end: Decimal,
    ) -> Result<Kilometres, ValidationError> {
        if end < start {
            return Err(ValidationError::OdometerReversed {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        let km = end
            .checked_sub(start)
            .ok_or_else(|| ValidationError::OutOfRange(format!("{start}..{end}")))?;
        Kilometres::new(km).ok_or_else(|| ValidationError::NegativeDistance(km.to_string()))
    }
}

/// Stored trip as read back from JSON.
#[derive(Debug, Deserialize)]
pub struct TripRecord {
    id: String,
    date: NaiveDate,
    #[serde(default)]
    destination: String,
    #[serde(default)]
    purpose: String,
    #[serde(default, alias = "startOdometer")]
    start_odometer: Option<Decimal>,
    #[serde(default, alias = "endOdometer")]
    end_odometer: Option<Decimal>,
    #[serde(default, alias = "distanceKm")]
    distance: Option<Kilometres>,
    #[serde(default, rename = "type")]
    type_tag: Option<String>,
    #[serde(default, alias = "isBusinessTrip")]
    is_business_trip: Option<bool>,
    #[serde(default, alias = "clientName")]
    client_name: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    source: String,
    #[serde(alias = "createdAt")]
    created_at: DateTime<Utc>,
}

impl TryFrom<TripRecord> for Trip {
    type Error = ValidationError;

    fn try_from(record: TripRecord) -> Result<Self, Self::Error> {
        let from_odometer = match (record.start_odometer, record.end_odometer) {
            (Some(start), Some(end)) => Some(Trip::odometer_distance(start, end)?),
            _ => None,
        };
        let distance = record
            .distance
            .or(from_odometer)
            .ok_or(ValidationError::MissingField("distance"))?;
        let kind = TripKind::reconcile(record.is_business_trip, record.type_tag.as_deref());

        Ok(Trip {
            id: record.id,
            date: record.date,
            destination: record.destination,
            purpose: record.purpose,
            start_odometer: record.start_odometer,
            end_odometer: record.end_odometer,
            distance,
            kind,
            client_name: record.client_name,
            notes: record.notes,
            source: record.source,
            created_at: record.created_at,
        })
    }
}

/// Business/personal split of a set of trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MileageLog {
    pub total_km: Decimal,
    pub business_km: Decimal,
    pub personal_km: Decimal,
    pub trip_count: usize,
    pub business_trip_count: usize,
    pub personal_trip_count: usize,
}

impl MileageLog {
    /// Totals saturate at the largest representable distance.
    pub fn from_trips<'a>(trips: impl IntoIterator<Item = &'a Trip>) -> Self {
        let mut log = MileageLog::default();
        for trip in trips {
            let km = trip.distance.value();
            log.trip_count += 1;
            match trip.kind {
                TripKind::Business => {
                    log.business_km = log.business_km.saturating_add(km);
                    log.business_trip_count += 1;
                }
                TripKind::Personal => {
                    log.personal_km = log.personal_km.saturating_add(km);
                    log.personal_trip_count += 1;
                }
            }
        }
        log.business_km = round_tenths(log.business_km);
        log.personal_km = round_tenths(log.personal_km);
        log.total_km = round_tenths(log.business_km.saturating_add(log.personal_km));
        log
    }

    /// Business share as a percentage with one decimal; zero when no distance.
    pub fn business_percent(&self) -> Decimal {
        if self.total_km.is_zero() {
            return Decimal::ZERO;
        }
        round_tenths(self.business_km / self.total_km * Decimal::ONE_HUNDRED)
    }
}
