use serde::{Deserialize, Serialize};
use std::fmt;

/// Canadian provinces and territories by their two-letter postal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Province {
    AB,
    BC,
    MB,
    NB,
    NL,
    NS,
    NT,
    NU,
    ON,
    PE,
    QC,
    SK,
    YT,
}

pub const ALL_PROVINCES: [Province; 13] = [
    Province::AB,
    Province::BC,
    Province::MB,
    Province::NB,
    Province::NL,
    Province::NS,
    Province::NT,
    Province::NU,
    Province::ON,
    Province::PE,
    Province::QC,
    Province::SK,
    Province::YT,
];

impl Province {
    pub fn code(self) -> &'static str {
        match self {
            Province::AB => "AB",
            Province::BC => "BC",
            Province::MB => "MB",
            Province::NB => "NB",
            Province::NL => "NL",
            Province::NS => "NS",
            Province::NT => "NT",
            Province::NU => "NU",
            Province::ON => "ON",
            Province::PE => "PE",
            Province::QC => "QC",
            Province::SK => "SK",
            Province::YT => "YT",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Province::AB => "Alberta",
            Province::BC => "British Columbia",
            Province::MB => "Manitoba",
            Province::NB => "New Brunswick",
            Province::NL => "Newfoundland and Labrador",
            Province::NS => "Nova Scotia",
            Province::NT => "Northwest Territories",
            Province::NU => "Nunavut",
            Province::ON => "Ontario",
            Province::PE => "Prince Edward Island",
            Province::QC => "Quebec",
            Province::SK => "Saskatchewan",
            Province::YT => "Yukon",
        }
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Province {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        let code = match code.as_str() {
            "PQ" => "QC",
            "NF" => "NL",
            "PEI" => "PE",
            other => other,
        };
        ALL_PROVINCES
            .iter()
            .copied()
            .find(|p| p.code() == code)
            .ok_or_else(|| format!("Unknown province: '{}'", s.trim()))
    }
}

/// Uppercased, trimmed form of a province code used for table lookups.
pub fn normalize_code(raw: &str) -> String {
    match raw.parse::<Province>() {
        Ok(p) => p.code().to_string(),
        Err(_) => raw.trim().to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!(" qc ".parse::<Province>().unwrap(), Province::QC);
        assert_eq!("On".parse::<Province>().unwrap(), Province::ON);
        assert_eq!("PQ".parse::<Province>().unwrap(), Province::QC);
        assert!("XX".parse::<Province>().is_err());
    }

    #[test]
    fn code_round_trips_through_display() {
        for p in ALL_PROVINCES {
            assert_eq!(p.to_string().parse::<Province>().unwrap(), p);
        }
    }

    #[test]
    fn normalize_keeps_unknown_codes() {
        assert_eq!(normalize_code("nf"), "NL");
        assert_eq!(normalize_code(" zz "), "ZZ");
    }
}
