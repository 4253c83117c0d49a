use rust_decimal::Decimal;
use std::str::FromStr;

/// Lowercase, trim, `_` to space, collapse runs of whitespace.
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Finds the header for a semantic field. Every candidate is tried as an exact
/// match before any candidate is tried as a substring, so `"date"` beats
/// `"update time"` even when listed later. Substring matching ignores
/// candidates shorter than three characters.
pub fn resolve_column<'h>(headers: &'h [String], candidates: &[&str]) -> Option<&'h str> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    for candidate in candidates {
        if let Some(i) = normalized.iter().position(|h| h == candidate) {
            return Some(headers[i].as_str());
        }
    }
    for candidate in candidates.iter().filter(|c| c.len() >= 3) {
        if let Some(i) = normalized.iter().position(|h| h.contains(candidate)) {
            return Some(headers[i].as_str());
        }
    }
    None
}

/// Whether a distance column is quoted in miles, judged from its header.
pub fn header_is_miles(header: &str) -> bool {
    let h = normalize_header(header);
    if h.contains("km") || h.contains("kilomet") {
        return false;
    }
    h.contains("mile") || h.contains("(mi)") || h.split(' ').any(|w| w == "mi")
}

/// Parse a currency cell: `$`, `,`, `CAD` and whitespace are stripped and
/// accounting parentheses mean negative.
pub fn parse_money(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    let (negative, s) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };
    let clean: String = s
        .replace("CAD", "")
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    let value = Decimal::from_str(&clean).ok()?;
    Some(if negative { -value } else { value })
}

/// Parse a distance cell, tolerating unit suffixes such as `12.5 mi` or `8 km`.
pub fn parse_distance(raw: &str) -> Option<Decimal> {
    let lower = raw.trim().to_lowercase();
    let stripped = lower.trim_end_matches(char::is_alphabetic).trim_end();
    let clean: String = stripped
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    Decimal::from_str(&clean).ok()
}
