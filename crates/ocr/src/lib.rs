//! Receipt text post-processing.
//!
//! Takes text already read off a receipt and recovers the total, date,
//! vendor, sales taxes and a suggested expense category, each by an ordered
//! list of patterns.

pub mod extract;
pub mod types;

pub use extract::{
    extract, extract_amount, extract_date, extract_tax, extract_vendor, parse_amount,
    suggest_category, PatternRule, ReceiptExtractor, RuleError, TaxKind, VendorEntry, VendorMatch,
};
pub use types::{ExtractionResult, TaxBreakdown, REVIEW_THRESHOLD};
