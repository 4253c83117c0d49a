use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::category::CategoryKey;
use crate::error::ValidationError;
use crate::money::Money;
use crate::period::RetentionPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    #[default]
    PendingReview,
    Approved,
    Rejected,
    Duplicate,
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::PendingReview => write!(f, "pending_review"),
            AuditStatus::Approved => write!(f, "approved"),
            AuditStatus::Rejected => write!(f, "rejected"),
            AuditStatus::Duplicate => write!(f, "duplicate"),
        }
    }
}

impl std::str::FromStr for AuditStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_review" => Ok(AuditStatus::PendingReview),
            "approved" => Ok(AuditStatus::Approved),
            "rejected" => Ok(AuditStatus::Rejected),
            "duplicate" => Ok(AuditStatus::Duplicate),
            other => Err(format!("Unknown audit status: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub date: NaiveDate,
    pub amount: Money,
    pub vendor: String,
    pub category: CategoryKey,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptMetadata {
    pub uploaded_at: DateTime<Utc>,
    pub retain_until: NaiveDate,
    pub audit_status: AuditStatus,
    pub source: String,
}

/// Canonical expense receipt handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseReceipt {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub expense: Expense,
    pub metadata: ReceiptMetadata,
}

impl ExpenseReceipt {
    /// Builds a receipt stamped at `now`, with retention derived from the
    /// expense date. Negative amounts are rejected.
    pub fn new(
        id: String,
        expense: Expense,
        source: &str,
        now: DateTime<Utc>,
        retention: RetentionPolicy,
    ) -> Result<Self, ValidationError> {
        if expense.amount.is_negative() {
            return Err(ValidationError::NegativeAmount(expense.amount));
        }
        let retain_until = retention.retain_until(expense.date);
        Ok(ExpenseReceipt {
            id,
            timestamp: now,
            expense,
            metadata: ReceiptMetadata {
                uploaded_at: now,
                retain_until,
                audit_status: AuditStatus::PendingReview,
                source: source.to_string(),
            },
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.expense.date
    }

    pub fn amount(&self) -> Money {
        self.expense.amount
    }

    pub fn category(&self) -> &CategoryKey {
        &self.expense.category
    }
}
