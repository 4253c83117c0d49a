use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use trajet_core::{CategoryRegistry, RetentionPolicy};

use crate::province::normalize_code;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse tax config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Rate '{0}' must not be negative")]
    NegativeRate(String),
    #[error("Mileage tier limit must not be negative")]
    NegativeTierLimit,
}

/// CRA simplified-method per-kilometre rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MileageRates {
    /// Business kilometres charged at `first_tier_rate`.
    pub tier_limit_km: Decimal,
    pub first_tier_rate: Decimal,
    pub second_tier_rate: Decimal,
    /// Added per business kilometre driven in the territories.
    pub territory_bonus_rate: Decimal,
    pub territories: Vec<String>,
}

impl Default for MileageRates {
    fn default() -> Self {
        MileageRates {
            tier_limit_km: Decimal::from(5000),
            first_tier_rate: Decimal::new(70, 2),
            second_tier_rate: Decimal::new(64, 2),
            territory_bonus_rate: Decimal::new(4, 2),
            territories: vec!["NT".into(), "NU".into(), "YT".into()],
        }
    }
}

impl MileageRates {
    pub fn is_territory(&self, province: &str) -> bool {
        let code = normalize_code(province);
        self.territories.iter().any(|t| normalize_code(t) == code)
    }
}

/// Every rate the tax engine applies. Defaults hold the current CRA values;
/// a TOML file may override any subset of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxConfig {
    pub gst_rate: Decimal,
    pub qst_rate: Decimal,
    /// Harmonized rate by province code. Provinces not listed charge no HST.
    pub hst_rates: BTreeMap<String, Decimal>,
    pub mileage: MileageRates,
    pub retention_years: u32,
    pub categories: CategoryRegistry,
}

impl Default for TaxConfig {
    fn default() -> Self {
        let fifteen = Decimal::new(15, 2);
        TaxConfig {
            gst_rate: Decimal::new(5, 2),
            qst_rate: Decimal::new(9975, 5),
            hst_rates: BTreeMap::from([
                ("ON".to_string(), Decimal::new(13, 2)),
                ("NB".to_string(), fifteen),
                ("NS".to_string(), fifteen),
                ("NL".to_string(), fifteen),
                ("PE".to_string(), fifteen),
            ]),
            mileage: MileageRates::default(),
            retention_years: 6,
            categories: CategoryRegistry::default(),
        }
    }
}

impl TaxConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: TaxConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("gst_rate", self.gst_rate),
            ("qst_rate", self.qst_rate),
            ("mileage.first_tier_rate", self.mileage.first_tier_rate),
            ("mileage.second_tier_rate", self.mileage.second_tier_rate),
            ("mileage.territory_bonus_rate", self.mileage.territory_bonus_rate),
        ];
        for (name, rate) in named {
            if rate.is_sign_negative() && !rate.is_zero() {
                return Err(ConfigError::NegativeRate(name.to_string()));
            }
        }
        for (code, rate) in &self.hst_rates {
            if rate.is_sign_negative() && !rate.is_zero() {
                return Err(ConfigError::NegativeRate(format!("hst_rates.{code}")));
            }
        }
        if self.mileage.tier_limit_km.is_sign_negative() && !self.mileage.tier_limit_km.is_zero() {
            return Err(ConfigError::NegativeTierLimit);
        }
        Ok(())
    }

    /// HST rate for `province`; zero when the province does not harmonize.
    pub fn hst_rate(&self, province: &str) -> Decimal {
        let code = normalize_code(province);
        self.hst_rates
            .iter()
            .find(|(k, _)| normalize_code(k) == code)
            .map(|(_, r)| *r)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy::new(self.retention_years)
    }
}
