use thiserror::Error;

use crate::money::Money;

/// A field violates a domain invariant. Importers skip the offending row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Amount must not be negative: {0}")]
    NegativeAmount(Money),
    #[error("Distance must not be negative: {0}")]
    NegativeDistance(String),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Value out of range: {0}")]
    OutOfRange(String),
    #[error("End odometer {end} is below start odometer {start}")]
    OdometerReversed { start: String, end: String },
}
