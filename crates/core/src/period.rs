use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar tax year. CRA self-employment filers use January 1 to December 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxYear(pub i32);

impl fmt::Display for TaxYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TY{}", self.0)
    }
}

impl TaxYear {
    pub fn new(year: i32) -> Self {
        TaxYear(year)
    }

    /// Compares calendar components only. Dates are never shifted through a
    /// timezone, so December 31 stays in its own year.
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.0
    }
}

/// How long supporting documents must be kept after the end of the tax year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub years: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy { years: 6 }
    }
}

impl RetentionPolicy {
    pub fn new(years: u32) -> Self {
        RetentionPolicy { years }
    }

    /// December 31 of the document's year, pushed forward by `years`.
    pub fn retain_until(self, date: NaiveDate) -> NaiveDate {
        let year = date.year().saturating_add(self.years as i32);
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX)
    }
}

const MONTHS_FULL: &[(&str, u32)] = &[
    ("january", 1), ("february", 2), ("march", 3), ("april", 4),
    ("may", 5), ("june", 6), ("july", 7), ("august", 8),
    ("september", 9), ("october", 10), ("november", 11), ("december", 12),
    ("janvier", 1), ("février", 2), ("fevrier", 2), ("mars", 3),
    ("avril", 4), ("mai", 5), ("juin", 6), ("juillet", 7),
    ("août", 8), ("aout", 8), ("septembre", 9), ("octobre", 10),
    ("novembre", 11), ("décembre", 12), ("decembre", 12),
];

const MONTHS_ABBR: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Month number for an English or French month name, or an English
/// three-letter prefix (`"Sept"` and `"sep."` both resolve to 9).
pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.trim().trim_end_matches('.').to_lowercase();
    if let Some((_, m)) = MONTHS_FULL.iter().find(|(n, _)| *n == lower) {
        return Some(*m);
    }
    let prefix: String = lower.chars().take(3).collect();
    if prefix.chars().count() < 3 {
        return None;
    }
    MONTHS_ABBR
        .iter()
        .position(|abbr| *abbr == prefix)
        .map(|i| i as u32 + 1)
}
