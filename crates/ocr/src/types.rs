use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trajet_core::{
    hash::record_id, CategoryKey, Clock, Expense, ExpenseReceipt, Money, RetentionPolicy,
    ValidationError,
};

/// Confidence below which a human should look at the receipt before it is used.
pub const REVIEW_THRESHOLD: u8 = 70;

/// Sales taxes printed on a receipt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub gst: Option<Money>,
    pub qst: Option<Money>,
    pub hst: Option<Money>,
    /// Sum of the taxes that were found; `None` when none were. Saturates
    /// rather than overflowing on absurd amounts.
    pub total_tax: Option<Money>,
}

impl TaxBreakdown {
    pub fn new(gst: Option<Money>, qst: Option<Money>, hst: Option<Money>) -> Self {
        let found = [gst, qst, hst];
        let total_tax = found
            .iter()
            .any(Option::is_some)
            .then(|| found.iter().flatten().copied().sum());
        TaxBreakdown { gst, qst, hst, total_tax }
    }

    pub fn is_empty(&self) -> bool {
        self.total_tax.is_none()
    }
}

/// Fields recovered from the text of one receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub vendor: Option<String>,
    pub category: CategoryKey,
    pub tax: TaxBreakdown,
    /// 0 to 100.
    pub confidence: u8,
    pub raw_text: String,
}

impl ExtractionResult {
    /// Whether the extraction is weak enough that it should be confirmed by hand.
    pub fn needs_review(&self) -> bool {
        self.confidence < REVIEW_THRESHOLD
    }

    /// Converts into a canonical receipt. A receipt without a readable date is
    /// dated today; one without an amount cannot be recorded.
    pub fn into_receipt(
        self,
        clock: &dyn Clock,
        retention: RetentionPolicy,
        source: &str,
    ) -> Result<ExpenseReceipt, ValidationError> {
        let amount = self.amount.ok_or(ValidationError::MissingField("amount"))?;
        let date = self.date.unwrap_or_else(|| clock.today());
        let vendor = self.vendor.unwrap_or_else(|| "Unknown".to_string());

        let date_key = date.to_string();
        let amount_key = amount.to_string();
        let id = record_id(&[source, date_key.as_str(), amount_key.as_str(), self.raw_text.as_str()]);

        let description = format!("Receipt from {vendor}");
        let expense = Expense {
            date,
            amount,
            vendor,
            category: self.category,
            description,
        };
        ExpenseReceipt::new(id, expense, source, clock.now(), retention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trajet_core::{AuditStatus, FixedClock};

    fn result(confidence: u8) -> ExtractionResult {
        ExtractionResult {
            amount: Some(Money::from_cents(4250)),
            date: NaiveDate::from_ymd_opt(2024, 6, 3),
            vendor: Some("Shell".into()),
            category: CategoryKey::new("fuel"),
            tax: TaxBreakdown::default(),
            confidence,
            raw_text: "SHELL\nTotal $42.50".into(),
        }
    }

    #[test]
    fn tax_total_sums_present_parts() {
        let t = TaxBreakdown::new(Some(Money::from_cents(250)), Some(Money::from_cents(499)), None);
        assert_eq!(t.total_tax, Some(Money::from_cents(749)));
        assert!(!t.is_empty());

        let none = TaxBreakdown::new(None, None, None);
        assert_eq!(none.total_tax, None);
        assert!(none.is_empty());
    }

    #[test]
    fn tax_total_saturates() {
        let max = Money::from_decimal(rust_decimal::Decimal::MAX);
        let t = TaxBreakdown::new(Some(max), Some(max), Some(Money::from_cents(1)));
        assert_eq!(t.total_tax, Some(max));
    }

    #[test]
    fn serializes_for_callers() {
        let json = serde_json::to_value(result(90)).unwrap();
        assert_eq!(json["amount"], "42.50");
        assert_eq!(json["date"], "2024-06-03");
        assert_eq!(json["category"], "fuel");
        assert_eq!(json["confidence"], 90);
        assert!(json["tax"]["total_tax"].is_null());
    }

    #[test]
    fn needs_review_threshold() {
        assert!(result(69).needs_review());
        assert!(!result(70).needs_review());
        assert!(!result(100).needs_review());
    }

    #[test]
    fn into_receipt_keeps_fields() {
        let clock = FixedClock::at_date(2025, 1, 10).unwrap();
        let receipt = result(90)
            .into_receipt(&clock, RetentionPolicy::default(), "ocr")
            .unwrap();
        assert_eq!(receipt.amount(), Money::from_cents(4250));
        assert_eq!(receipt.date(), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(receipt.expense.vendor, "Shell");
        assert_eq!(receipt.expense.description, "Receipt from Shell");
        assert_eq!(receipt.metadata.audit_status, AuditStatus::PendingReview);
        assert_eq!(receipt.metadata.retain_until, NaiveDate::from_ymd_opt(2030, 12, 31).unwrap());
        assert_eq!(receipt.id.len(), 16);
    }

    #[test]
    fn into_receipt_defaults_date_to_today() {
        let clock = FixedClock::at_date(2025, 1, 10).unwrap();
        let r = ExtractionResult { date: None, vendor: None, ..result(55) };
        let receipt = r.into_receipt(&clock, RetentionPolicy::default(), "ocr").unwrap();
        assert_eq!(receipt.date(), NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert_eq!(receipt.expense.vendor, "Unknown");
    }

    #[test]
    fn into_receipt_requires_amount() {
        let clock = FixedClock::at_date(2025, 1, 10).unwrap();
        let r = ExtractionResult { amount: None, ..result(60) };
        assert_eq!(
            r.into_receipt(&clock, RetentionPolicy::default(), "ocr"),
            Err(ValidationError::MissingField("amount"))
        );
    }
}
