use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::{Captures, Regex};
use trajet_core::month_from_name;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_iso_prefix, r"^(\d{4})-(\d{1,2})-(\d{1,2})");
re!(re_us_slash, r"^(\d{1,2})/(\d{1,2})/(\d{4})\b");
re!(re_month_first,
    r"^([A-Za-zÀ-ÿ]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b");
re!(re_day_first,
    r"^(\d{1,2})(?:er)?\s+([A-Za-zÀ-ÿ]+)\.?,?\s+(\d{4})\b");
re!(re_numeric_day_month, r"^(\d{1,2})[./-](\d{1,2})[./-](\d{4})\b");

/// Formats tried last, after every pattern above has failed.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d-%b-%Y",
    "%b %d %Y",
    "%A, %B %d, %Y",
    "%a %b %d %Y",
];

/// Turns the date strings found in platform exports into calendar dates.
///
/// Formats are tried in a fixed order and the first valid date wins:
/// ISO prefix, `M/D/YYYY`, `Mon D, YYYY`, `D Month YYYY`, numeric day-first
/// (falling back to month-first), then a handful of generic layouts.
/// Unrecognized or impossible dates yield `None`.
pub fn normalize(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(c) = re_iso_prefix().captures(s) {
        if let Some(d) = ymd(&c, 1, 2, 3) {
            return Some(d);
        }
    }
    if let Some(c) = re_us_slash().captures(s) {
        if let Some(d) = ymd(&c, 3, 1, 2) {
            return Some(d);
        }
    }
    if let Some(c) = re_month_first().captures(s) {
        if let Some(d) = named_month(&c, 1, 2, 3) {
            return Some(d);
        }
    }
    if let Some(c) = re_day_first().captures(s) {
        if let Some(d) = named_month(&c, 2, 1, 3) {
            return Some(d);
        }
    }
    if let Some(c) = re_numeric_day_month().captures(s) {
        if let Some(d) = ymd(&c, 3, 2, 1).or_else(|| ymd(&c, 3, 1, 2)) {
            return Some(d);
        }
    }

    generic_parse(s)
}

fn ymd(c: &Captures, y: usize, m: usize, d: usize) -> Option<NaiveDate> {
    let year: i32 = c.get(y)?.as_str().parse().ok()?;
    let month: u32 = c.get(m)?.as_str().parse().ok()?;
    let day: u32 = c.get(d)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn named_month(c: &Captures, m: usize, d: usize, y: usize) -> Option<NaiveDate> {
    let month = month_from_name(c.get(m)?.as_str())?;
    let day: u32 = c.get(d)?.as_str().parse().ok()?;
    let year: i32 = c.get(y)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn generic_parse(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    FALLBACK_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn iso_date_and_datetime_prefix() {
        assert_eq!(normalize("2024-01-15"), date(2024, 1, 15));
        assert_eq!(normalize("2024-01-15 08:30:00 +0000 UTC"), date(2024, 1, 15));
        assert_eq!(normalize("2024-12-31T23:59:59-05:00"), date(2024, 12, 31));
    }

    #[test]
    fn us_slash_is_month_first() {
        assert_eq!(normalize("1/5/2024"), date(2024, 1, 5));
        assert_eq!(normalize("03/04/2024 10:15 AM"), date(2024, 3, 4));
    }

    #[test]
    fn day_first_when_month_first_is_impossible() {
        assert_eq!(normalize("25/12/2024"), date(2024, 12, 25));
        assert_eq!(normalize("25.12.2024"), date(2024, 12, 25));
    }

    #[test]
    fn numeric_with_dashes_prefers_day_first() {
        assert_eq!(normalize("03-04-2024"), date(2024, 4, 3));
        assert_eq!(normalize("12-25-2024"), date(2024, 12, 25));
    }

    #[test]
    fn month_name_first() {
        assert_eq!(normalize("Jan 15, 2024"), date(2024, 1, 15));
        assert_eq!(normalize("january 15 2024"), date(2024, 1, 15));
        assert_eq!(normalize("Sept. 3rd, 2024"), date(2024, 9, 3));
    }

    #[test]
    fn day_first_month_name() {
        assert_eq!(normalize("15 March 2024"), date(2024, 3, 15));
        assert_eq!(normalize("1er juillet 2024"), date(2024, 7, 1));
        assert_eq!(normalize("3 août 2024"), date(2024, 8, 3));
    }

    #[test]
    fn generic_fallbacks() {
        assert_eq!(normalize("2024/02/29"), date(2024, 2, 29));
        assert_eq!(normalize("15-Jan-2024"), date(2024, 1, 15));
        assert_eq!(normalize("Mon, 15 Jan 2024 10:00:00 +0000"), date(2024, 1, 15));
    }

    #[test]
    fn invalid_inputs_yield_none() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize("not a date"), None);
        assert_eq!(normalize("2024-02-30"), None);
        assert_eq!(normalize("13/13/2024"), None);
        assert_eq!(normalize("Smarch 3, 2024"), None);
    }
}
