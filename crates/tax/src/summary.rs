use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trajet_core::{
    CategoryKey, Clock, ExpenseReceipt, Language, MileageLog, Money, TaxYear, Trip,
};

use crate::config::TaxConfig;
use crate::mileage::calculate_mileage_deduction;
use crate::province::{normalize_code, Province};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub label: String,
    pub total: Money,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTotals {
    pub categories: BTreeMap<CategoryKey, CategoryTotal>,
    pub total_expenses: Money,
    pub receipt_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MileageSummary {
    pub total_km: Decimal,
    pub total_business_km: Decimal,
    pub total_personal_km: Decimal,
    pub business_percent: Decimal,
    pub trip_count: usize,
    pub business_trip_count: usize,
    pub personal_trip_count: usize,
    pub deduction: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTaxPaid {
    pub gst_paid: Money,
    pub qst_paid: Money,
    pub hst_paid: Money,
    pub total_tax_paid: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_deductions: Money,
    pub total_tax_credits: Money,
}

/// Year-end figures for the T2125 statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSummary {
    pub year: i32,
    pub province: String,
    pub expenses: ExpenseTotals,
    pub mileage: MileageSummary,
    pub tax: SalesTaxPaid,
    pub totals: Totals,
    pub generated_at: DateTime<Utc>,
}

impl TaxSummary {
    pub fn category_total(&self, key: &CategoryKey) -> Money {
        self.expenses
            .categories
            .get(key)
            .map(|c| c.total)
            .unwrap_or_default()
    }
}

/// Aggregates receipts and trips dated in `year` into a [`TaxSummary`].
///
/// Every registry category appears in the result, at zero when unused.
/// Receipts under a key outside the registry get an entry of their own.
/// GST is always computed; QST only for Quebec; HST from the province table.
/// An unknown province is not an error: it simply has no provincial tax.
pub fn summarize(
    receipts: &[ExpenseReceipt],
    trips: &[Trip],
    province: &str,
    year: i32,
    config: &TaxConfig,
    clock: &dyn Clock,
) -> TaxSummary {
    let tax_year = TaxYear::new(year);
    let code = normalize_code(province);
    let known = province.parse::<Province>().ok();
    if known.is_none() {
        tracing::warn!(province = %code, "unknown province; provincial sales tax taken as 0%");
    }

    let expenses = expense_totals(receipts, tax_year, config);

    let log = MileageLog::from_trips(trips.iter().filter(|t| tax_year.contains(t.date)));
    let deduction = calculate_mileage_deduction(
        log.business_km,
        &config.mileage,
        config.mileage.is_territory(&code),
    );
    let mileage = MileageSummary {
        total_km: log.total_km,
        total_business_km: log.business_km,
        total_personal_km: log.personal_km,
        business_percent: log.business_percent(),
        trip_count: log.trip_count,
        business_trip_count: log.business_trip_count,
        personal_trip_count: log.personal_trip_count,
        deduction,
    };

    let base = expenses.total_expenses;
    let gst_paid = base.times_rate(config.gst_rate);
    let qst_paid = if known == Some(Province::QC) {
        base.times_rate(config.qst_rate)
    } else {
        Money::zero()
    };
    let hst_paid = base.times_rate(config.hst_rate(&code));
    let total_tax_paid = gst_paid + qst_paid + hst_paid;

    let totals = Totals {
        total_deductions: expenses.total_expenses + mileage.deduction,
        total_tax_credits: total_tax_paid,
    };

    tracing::info!(
        year,
        province = %code,
        receipts = expenses.receipt_count,
        trips = mileage.trip_count,
        total_expenses = %expenses.total_expenses,
        deduction = %mileage.deduction,
        "tax summary generated"
    );

    TaxSummary {
        year,
        province: code,
        expenses,
        mileage,
        tax: SalesTaxPaid {
            gst_paid,
            qst_paid,
            hst_paid,
            total_tax_paid,
        },
        totals,
        generated_at: clock.now(),
    }
}

fn expense_totals(receipts: &[ExpenseReceipt], year: TaxYear, config: &TaxConfig) -> ExpenseTotals {
    let mut categories: BTreeMap<CategoryKey, CategoryTotal> = config
        .categories
        .iter()
        .map(|def| {
            let total = CategoryTotal {
                label: def.label(Language::En).to_string(),
                total: Money::zero(),
                count: 0,
            };
            (def.key.clone(), total)
        })
        .collect();

    let mut total_expenses = Money::zero();
    let mut receipt_count = 0;
    for receipt in receipts.iter().filter(|r| year.contains(r.date())) {
        let amount = receipt.amount();
        let entry = categories
            .entry(receipt.category().clone())
            .or_insert_with(|| CategoryTotal {
                label: config.categories.label(receipt.category(), Language::En),
                total: Money::zero(),
                count: 0,
            });
        entry.total += amount;
        entry.count += 1;
        total_expenses += amount;
        receipt_count += 1;
    }

    ExpenseTotals {
        categories,
        total_expenses,
        receipt_count,
    }
}
