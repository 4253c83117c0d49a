use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::normalize_header;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Uber,
    Lyft,
    Generic,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Uber => write!(f, "uber"),
            Platform::Lyft => write!(f, "lyft"),
            Platform::Generic => write!(f, "generic"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uber" => Ok(Platform::Uber),
            "lyft" => Ok(Platform::Lyft),
            "generic" | "csv" => Ok(Platform::Generic),
            other => Err(format!("Unknown platform: '{other}'")),
        }
    }
}

const UBER_MARKERS: &[&str] = &["trip or order uuid", "driver payment", "begin trip time"];
const UBER_FRAGMENTS: &[&str] = &["gross fare", "uber service"];
const LYFT_MARKERS: &[&str] = &["ride id", "ride type", "ride earnings"];

/// Classifies an export by its header row. Uber markers are checked before
/// Lyft markers; anything else is generic. Case, surrounding whitespace and
/// column order do not matter.
pub fn detect(headers: &[String]) -> Platform {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let has = |marker: &str| normalized.iter().any(|h| h == marker);
    let has_fragment = |fragment: &str| normalized.iter().any(|h| h.contains(fragment));

    if UBER_MARKERS.iter().any(|m| has(m)) || UBER_FRAGMENTS.iter().any(|f| has_fragment(f)) {
        return Platform::Uber;
    }
    if LYFT_MARKERS.iter().any(|m| has(m)) || (has("driver earnings") && has("ride distance")) {
        return Platform::Lyft;
    }
    Platform::Generic
}
