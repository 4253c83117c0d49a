//! Persistence seam. The importers and the tax engine only hand records to,
//! or read records from, these traits; durable storage lives elsewhere.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::category::CategoryKey;
use crate::period::TaxYear;
use crate::receipt::ExpenseReceipt;
use crate::trip::Trip;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Record already exists: {0}")]
    Duplicate(String),
}

pub trait TripStore {
    fn create_trip(&mut self, trip: Trip) -> Result<(), StoreError>;
    fn update_trip(&mut self, trip: Trip) -> Result<(), StoreError>;
    fn delete_trip(&mut self, id: &str) -> Result<Trip, StoreError>;
    fn get_trip(&self, id: &str) -> Option<&Trip>;
    fn trips_for_year(&self, year: TaxYear) -> Vec<&Trip>;
}

pub trait ReceiptStore {
    fn create_receipt(&mut self, receipt: ExpenseReceipt) -> Result<(), StoreError>;
    fn update_receipt(&mut self, receipt: ExpenseReceipt) -> Result<(), StoreError>;
    fn delete_receipt(&mut self, id: &str) -> Result<ExpenseReceipt, StoreError>;
    fn get_receipt(&self, id: &str) -> Option<&ExpenseReceipt>;
    fn receipts_for_year(&self, year: TaxYear) -> Vec<&ExpenseReceipt>;
    fn receipts_for_category(&self, category: &CategoryKey) -> Vec<&ExpenseReceipt>;
}

/// Volatile store keyed by record id, ordered for stable listings.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    trips: BTreeMap<String, Trip>,
    receipts: BTreeMap<String, ExpenseReceipt>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts records whose id is not yet present; returns how many were new.
    pub fn insert_new(&mut self, trips: Vec<Trip>, receipts: Vec<ExpenseReceipt>) -> usize {
        let mut added = 0;
        for trip in trips {
            if self.create_trip(trip).is_ok() {
                added += 1;
            }
        }
        for receipt in receipts {
            if self.create_receipt(receipt).is_ok() {
                added += 1;
            }
        }
        added
    }

    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips.values()
    }

    pub fn receipts(&self) -> impl Iterator<Item = &ExpenseReceipt> {
        self.receipts.values()
    }
}

impl TripStore for MemoryStore {
    fn create_trip(&mut self, trip: Trip) -> Result<(), StoreError> {
        if self.trips.contains_key(&trip.id) {
            return Err(StoreError::Duplicate(trip.id));
        }
        self.trips.insert(trip.id.clone(), trip);
        Ok(())
    }

    fn update_trip(&mut self, trip: Trip) -> Result<(), StoreError> {
        match self.trips.get_mut(&trip.id) {
            Some(existing) => {
                *existing = trip;
                Ok(())
            }
            None => Err(StoreError::NotFound(trip.id)),
        }
    }

    fn delete_trip(&mut self, id: &str) -> Result<Trip, StoreError> {
        self.trips
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn get_trip(&self, id: &str) -> Option<&Trip> {
        self.trips.get(id)
    }

    fn trips_for_year(&self, year: TaxYear) -> Vec<&Trip> {
        self.trips.values().filter(|t| year.contains(t.date)).collect()
    }
}

impl ReceiptStore for MemoryStore {
    fn create_receipt(&mut self, receipt: ExpenseReceipt) -> Result<(), StoreError> {
        if self.receipts.contains_key(&receipt.id) {
            return Err(StoreError::Duplicate(receipt.id));
        }
        self.receipts.insert(receipt.id.clone(), receipt);
        Ok(())
    }

    fn update_receipt(&mut self, receipt: ExpenseReceipt) -> Result<(), StoreError> {
        match self.receipts.get_mut(&receipt.id) {
            Some(existing) => {
                *existing = receipt;
                Ok(())
            }
            None => Err(StoreError::NotFound(receipt.id)),
        }
    }

    fn delete_receipt(&mut self, id: &str) -> Result<ExpenseReceipt, StoreError> {
        self.receipts
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn get_receipt(&self, id: &str) -> Option<&ExpenseReceipt> {
        self.receipts.get(id)
    }

    fn receipts_for_year(&self, year: TaxYear) -> Vec<&ExpenseReceipt> {
        self.receipts.values().filter(|r| year.contains(r.date())).collect()
    }

    fn receipts_for_category(&self, category: &CategoryKey) -> Vec<&ExpenseReceipt> {
        self.receipts.values().filter(|r| r.category() == category).collect()
    }
}
