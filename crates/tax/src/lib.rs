//! CRA tax aggregation over canonical trips and receipts.

pub mod config;
pub mod mileage;
pub mod province;
pub mod summary;

pub use config::{ConfigError, MileageRates, TaxConfig};
pub use mileage::calculate_mileage_deduction;
pub use province::{Province, ALL_PROVINCES};
pub use summary::{
    summarize, CategoryTotal, ExpenseTotals, MileageSummary, SalesTaxPaid, TaxSummary, Totals,
};

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use trajet_core::{
        CategoryKey, Clock, ExpenseReceipt, FixedClock, MemoryStore, Money, ReceiptStore, TaxYear,
        Trip, TripStore,
    };
    use trajet_import::{import_csv, AdapterOptions, Platform};

    const UBER_EXPORT: &str = "\
Trip or Order UUID,Begin Trip Time,Trip Distance,Driver Payment,Dropoff Address
u1,2024-02-10 09:12:00 +0000 UTC,12.5,$24.80,Gare Centrale
u2,2024-02-11 17:40:00 +0000 UTC,3.1,$9.15,Vieux-Port
u3,2023-12-31 23:10:00 +0000 UTC,6.0,$14.00,Plateau
u4,not a date,4.0,$8.00,Verdun
";

    const FUEL_RECEIPT: &str = "\
PETRO-CANADA
1455 rue Peel, Montréal
2024-03-02
Essence 38.20 L
TPS: 3,00 $
TVQ: 5,98 $
Total: 68,98 $
";

    fn clock() -> FixedClock {
        FixedClock::at_date(2025, 3, 15).unwrap()
    }

    #[test]
    fn csv_and_receipt_to_summary() {
        let clock = clock();
        let config = TaxConfig::default();

        let batch = import_csv(UBER_EXPORT, &AdapterOptions::default(), &clock);
        assert_eq!(batch.summary.platform, Platform::Uber);
        assert_eq!(batch.summary.imported_rows, 3);
        assert_eq!(batch.summary.skipped.len(), 1);

        let extraction = trajet_ocr::extract(FUEL_RECEIPT);
        assert!(!extraction.needs_review());
        let fuel = extraction
            .into_receipt(&clock, config.retention(), "ocr")
            .unwrap();

        let mut store = MemoryStore::new();
        assert_eq!(store.insert_new(batch.trips.clone(), batch.receipts.clone()), 6);
        store.create_receipt(fuel).unwrap();
        // a second import of the same file adds nothing
        assert_eq!(store.insert_new(batch.trips, batch.receipts), 0);

        let year = TaxYear::new(2024);
        let trips: Vec<Trip> = store.trips_for_year(year).into_iter().cloned().collect();
        let receipts: Vec<ExpenseReceipt> =
            store.receipts_for_year(year).into_iter().cloned().collect();
        let summary = summarize(&receipts, &trips, "QC", 2024, &config, &clock);

        // 12.5 mi -> 20.1 km, 3.1 mi -> 5.0 km
        assert_eq!(summary.mileage.total_business_km, Decimal::from_str("25.1").unwrap());
        assert_eq!(summary.mileage.business_percent, Decimal::from(100));
        assert_eq!(summary.mileage.deduction, Money::from_cents(1757));

        assert_eq!(summary.expenses.receipt_count, 3);
        assert_eq!(summary.category_total(&CategoryKey::new("fuel")), Money::from_cents(6898));
        assert_eq!(summary.category_total(&CategoryKey::other()), Money::from_cents(3395));
        assert_eq!(summary.expenses.total_expenses, Money::from_cents(10_293));
        assert_eq!(
            summary.totals.total_deductions,
            summary.expenses.total_expenses + summary.mileage.deduction
        );
        assert_eq!(summary.generated_at, clock.now());
    }
}
